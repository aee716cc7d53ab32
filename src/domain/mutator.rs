//! Catalog of the PIT mutation operators this crate knows by name.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

const GREGOR: &str = "org.pitest.mutationtest.engine.gregor.mutators.";
const EXPERIMENTAL: &str = "org.pitest.mutationtest.engine.gregor.mutators.experimental.";

/// A mutation operator, identified by the fully-qualified class name PIT reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mutator {
    /// Replaces a method call with one of its arguments.
    ArgumentPropagation,
    /// `<` to `<=` and friends.
    ConditionalsBoundary,
    /// Removes constructor calls.
    ConstructorCall,
    /// Alters local variable increments.
    Increments,
    /// Alters inline constants.
    InlineConstant,
    /// Negates numeric values.
    InvertNegatives,
    /// Swaps arithmetic operators.
    Math,
    /// Negates conditionals.
    NegateConditionals,
    /// Removes calls to non-void methods.
    NonVoidMethodCall,
    /// Replaces a conditional with a constant.
    RemoveConditional,
    /// Changes method return values.
    ReturnValues,
    /// Removes calls to void methods.
    VoidMethodCall,
    /// Removes member variable assignments.
    MemberVariable,
    /// Replaces a call with its receiver.
    NakedReceiver,
    /// Removes increments.
    RemoveIncrements,
    /// Removes switch labels.
    RemoveSwitch,
    /// Experimental return value replacement.
    ExperimentalReturnValues,
    /// Swaps switch labels with the default.
    Switch,
    /// Any operator not in the catalog.
    Unknown,
}

/// Display data for one catalog entry.
struct Entry {
    class: &'static str,
    experimental: bool,
    name: &'static str,
    description: &'static str,
}

impl Mutator {
    /// Every operator with a known key.
    pub const KNOWN: [Mutator; 18] = [
        Self::ArgumentPropagation,
        Self::ConditionalsBoundary,
        Self::ConstructorCall,
        Self::Increments,
        Self::InlineConstant,
        Self::InvertNegatives,
        Self::Math,
        Self::NegateConditionals,
        Self::NonVoidMethodCall,
        Self::RemoveConditional,
        Self::ReturnValues,
        Self::VoidMethodCall,
        Self::MemberVariable,
        Self::NakedReceiver,
        Self::RemoveIncrements,
        Self::RemoveSwitch,
        Self::ExperimentalReturnValues,
        Self::Switch,
    ];

    /// Key of the sentinel operator.
    pub const UNKNOWN_KEY: &'static str = "unknown";

    fn entry(&self) -> Entry {
        let (class, experimental, name, description) = match self {
            Self::ArgumentPropagation => (
                "ArgumentPropagationMutator",
                false,
                "Argument Propagation Mutator",
                "A method call has been replaced by one of its arguments of matching type",
            ),
            Self::ConditionalsBoundary => (
                "ConditionalsBoundaryMutator",
                false,
                "Conditionals Boundary Mutator",
                "A relational operator has been replaced by a boundary counterpart",
            ),
            Self::ConstructorCall => (
                "ConstructorCallMutator",
                false,
                "Constructor Calls Mutator",
                "A constructor call has been removed",
            ),
            Self::Increments => (
                "IncrementsMutator",
                false,
                "Increments Mutator",
                "A local variable increment/decrement has been replaced",
            ),
            Self::InlineConstant => (
                "InlineConstantMutator",
                false,
                "Inline Constant Mutator",
                "An inline constant has been changed",
            ),
            Self::InvertNegatives => (
                "InvertNegsMutator",
                false,
                "Invert Negatives Mutator",
                "A number has been replaced by its opposite",
            ),
            Self::Math => (
                "MathMutator",
                false,
                "Math Mutator",
                "A binary arithmetic operation has been replaced by another one",
            ),
            Self::NegateConditionals => (
                "NegateConditionalsMutator",
                false,
                "Negate Conditionals Mutator",
                "A conditional expression has been negated",
            ),
            Self::NonVoidMethodCall => (
                "NonVoidMethodCallMutator",
                false,
                "Non Void Method Calls Mutator",
                "A method call has been removed",
            ),
            Self::RemoveConditional => (
                "RemoveConditionalMutator",
                false,
                "Remove Conditional Mutator",
                "A conditional expression has been replaced by a constant",
            ),
            Self::ReturnValues => (
                "ReturnValsMutator",
                false,
                "Return Values Mutator",
                "The return value of a method call has been replaced",
            ),
            Self::VoidMethodCall => (
                "VoidMethodCallMutator",
                false,
                "Void Method Calls Mutator",
                "A method call has been removed",
            ),
            Self::MemberVariable => (
                "MemberVariableMutator",
                true,
                "Experimental Member Variable Mutator",
                "An assignment to a member variable has been removed",
            ),
            Self::NakedReceiver => (
                "NakedReceiverMutator",
                true,
                "Experimental Naked Receiver Mutator",
                "A method call has been replaced by its receiver",
            ),
            Self::RemoveIncrements => (
                "RemoveIncrementsMutator",
                true,
                "Experimental Remove Increments Mutator",
                "An increment has been removed",
            ),
            Self::RemoveSwitch => (
                "RemoveSwitchMutator",
                true,
                "Experimental Remove Switch Mutator",
                "A switch case label has been removed",
            ),
            Self::ExperimentalReturnValues => (
                "ReturnValuesMutator",
                true,
                "Experimental Return Values Mutator",
                "The return value of a method has been replaced",
            ),
            Self::Switch => (
                "SwitchMutator",
                true,
                "Experimental Switch Mutator",
                "Switch case labels have been swapped with the default label",
            ),
            Self::Unknown => ("", false, "Unknown Mutator", "Unknown Mutator"),
        };
        Entry {
            class,
            experimental,
            name,
            description,
        }
    }

    /// Resolve a fully-qualified operator key. Anything that is not an exact catalog key,
    /// including absent input, resolves to [`Mutator::Unknown`].
    pub fn parse<'a>(key: impl Into<Option<&'a str>>) -> Self {
        let Some(key) = key.into() else {
            return Self::Unknown;
        };
        Self::KNOWN
            .into_iter()
            .find(|mutator| mutator.matches_key(key))
            .unwrap_or(Self::Unknown)
    }

    fn matches_key(&self, key: &str) -> bool {
        let entry = self.entry();
        let package = if entry.experimental { EXPERIMENTAL } else { GREGOR };
        key.strip_prefix(package) == Some(entry.class)
    }

    /// Stable key: the fully-qualified operator class, or `"unknown"`.
    pub fn key(&self) -> String {
        let entry = self.entry();
        match self {
            Self::Unknown => Self::UNKNOWN_KEY.to_string(),
            _ if entry.experimental => format!("{EXPERIMENTAL}{}", entry.class),
            _ => format!("{GREGOR}{}", entry.class),
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        self.entry().name
    }

    /// What the operator did to the code, phrased as a past-tense sentence.
    pub fn description(&self) -> &'static str {
        self.entry().description
    }

    /// True for operators from PIT's experimental package.
    pub fn is_experimental(&self) -> bool {
        self.entry().experimental
    }
}

impl fmt::Display for Mutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Mutator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Mutator", 3)?;
        state.serialize_field("key", &self.key())?;
        state.serialize_field("name", self.name())?;
        state.serialize_field("description", self.description())?;
        state.end()
    }
}
