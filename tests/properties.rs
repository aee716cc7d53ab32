use proptest::prelude::*;

use pitest_quality::analysis::insufficient_coverage_finding;
use pitest_quality::domain::java_source_path;
use pitest_quality::prelude::*;

fn package_segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

fn class_segment() -> impl Strategy<Value = String> {
    "[A-Z][A-Za-z0-9]{0,11}"
}

fn file_with(total: usize, detected: usize) -> SourceFileReport {
    let mutants = (0..total).map(|i| {
        let (status, flag) = if i < detected {
            (MutantStatus::Killed, true)
        } else {
            (MutantStatus::Survived, false)
        };
        Mutant::new(flag, status, "com.foo.Bar", 1, Mutator::Math)
    });
    ProjectReport::build(mutants)
        .source_file_reports()
        .next()
        .cloned()
        .expect("one file expected")
}

proptest! {
    #[test]
    fn inner_classes_share_the_outer_file(
        packages in prop::collection::vec(package_segment(), 0..4),
        class in class_segment(),
        inner in "[A-Za-z0-9]{1,6}",
    ) {
        let mut qualified = packages.clone();
        qualified.push(class.clone());
        let outer = qualified.join(".");
        let nested = format!("{outer}${inner}");

        let path = java_source_path(&outer);
        prop_assert_eq!(&path, &java_source_path(&nested));
        let file_name = format!("{class}.java");
        prop_assert!(path.ends_with(&file_name));
        prop_assert_eq!(path.matches('.').count(), 1);
        prop_assert_eq!(path.matches('/').count(), packages.len());
    }

    #[test]
    fn status_parsing_is_exact_and_case_sensitive(raw in "[A-Za-z_]{0,12}") {
        let parsed = MutantStatus::parse(raw.as_str());
        if parsed == MutantStatus::Unknown {
            prop_assert!(
                MutantStatus::ALL
                    .iter()
                    .filter(|status| **status != MutantStatus::Unknown)
                    .all(|status| status.as_str() != raw)
            );
        } else {
            prop_assert_eq!(parsed.as_str(), raw.as_str());
        }
    }

    #[test]
    fn lowercase_statuses_are_unknown(index in 0usize..5) {
        let status = MutantStatus::ALL[index];
        prop_assert_eq!(MutantStatus::parse(status.as_str()), status);
        prop_assert_eq!(
            MutantStatus::parse(status.as_str().to_lowercase().as_str()),
            MutantStatus::Unknown
        );
    }

    #[test]
    fn coverage_finding_matches_the_ratio(
        (total, detected) in (1usize..200).prop_flat_map(|total| (Just(total), 0..=total)),
        percent in 0u8..=100,
    ) {
        let file = file_with(total, detected);
        let threshold = CoverageThreshold::new(percent).expect("percent is in range");
        let finding = insufficient_coverage_finding(&file, threshold);
        let below = (detected as f64) * 100.0 / (total as f64) < f64::from(percent);
        prop_assert_eq!(finding.is_some(), below);

        if let Some(finding) = finding {
            let expected = (total * usize::from(percent) / 100)
                .saturating_sub(detected)
                .max(1);
            let prefix = format!("{expected} more mutants");
            prop_assert!(finding.message.starts_with(&prefix));
            let suffix = format!("minimum threshold of {percent}% mutant coverage");
            prop_assert!(finding.message.ends_with(&suffix));
            prop_assert_eq!(finding.line, None);
        }
    }

    #[test]
    fn project_metrics_sum_file_counts(
        sizes in prop::collection::vec((1usize..20, 0usize..20), 1..6),
    ) {
        let mut mutants = Vec::new();
        for (index, (total, detected)) in sizes.iter().enumerate() {
            let detected = (*detected).min(*total);
            for i in 0..*total {
                let flag = i < detected;
                let status = if flag { MutantStatus::Killed } else { MutantStatus::Survived };
                mutants.push(Mutant::new(flag, status, format!("p.C{index}"), 1, Mutator::Math));
            }
        }
        let expected_total: usize = sizes.iter().map(|(total, _)| total).sum();
        let expected_detected: usize = sizes
            .iter()
            .map(|(total, detected)| (*detected).min(*total))
            .sum();

        let report = analyze_mutants(mutants, &|path: &str| Some(path.len()), &ActiveRules::none());
        prop_assert_eq!(report.files.len(), sizes.len());
        prop_assert_eq!(report.project.counts.total, expected_total);
        prop_assert_eq!(report.project.counts.detected, expected_detected);
        let coverage = report.project.coverage_percent.expect("project has mutants");
        let expected = expected_detected as f64 * 100.0 / expected_total as f64;
        prop_assert!((coverage - expected).abs() < 1e-9);
    }
}
