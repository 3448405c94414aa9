#[cfg(test)]
mod tests {
    use crate::core::error::AnalysisError;
    use crate::parsing::manifest::{parse_manifest, parse_manifest_str};
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use tempfile::NamedTempFile;

    /// Test parsing a manifest with per-sub exposure and filter
    #[test]
    fn test_parse_full_entries() {
        let json = r#"[
            {"file": "Ha_0001.tif", "exposureSeconds": 600, "filter": "Ha"},
            {"file": "OIII_0001.tif", "exposureSeconds": 600.0, "filter": "OIII"},
            {"file": "/abs/L_0001.tif", "exposureSeconds": 120}
        ]"#;

        let subs = parse_manifest_str(json, Path::new("/data/M42"), 300.0).unwrap();
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[0].path, PathBuf::from("/data/M42/Ha_0001.tif"));
        assert_eq!(subs[0].exposure.value(), 600.0);
        assert_eq!(subs[0].filter.as_deref(), Some("Ha"));
        assert_eq!(subs[2].path, PathBuf::from("/abs/L_0001.tif"));
        assert_eq!(subs[2].filter, None);
    }

    /// Test that missing exposures fall back to the default
    #[test]
    fn test_default_exposure() {
        let json = r#"[{"file": "a.tif"}, {"file": "b.tif", "filter": "  "}]"#;
        let subs = parse_manifest_str(json, Path::new("."), 180.0).unwrap();
        assert!(subs.iter().all(|s| s.exposure.value() == 180.0));
        assert_eq!(subs[1].filter, None);
    }

    #[test]
    fn test_entry_order_preserved() {
        let json = r#"[{"file": "z.tif"}, {"file": "a.tif"}, {"file": "m.tif"}]"#;
        let subs = parse_manifest_str(json, Path::new("."), 60.0).unwrap();
        let names: Vec<String> = subs.iter().map(|s| s.file_name()).collect();
        assert_eq!(names, vec!["z.tif", "a.tif", "m.tif"]);
    }

    #[test]
    fn test_bad_exposure_rejected() {
        let json = r#"[{"file": "a.tif", "exposureSeconds": -5}]"#;
        assert!(parse_manifest_str(json, Path::new("."), 60.0).is_err());

        let json = r#"[{"file": "  "}]"#;
        assert!(parse_manifest_str(json, Path::new("."), 60.0).is_err());
    }

    #[test]
    fn test_type_error_reports_location() {
        let json = r#"[{"file": "a.tif"}, {"file": "b.tif", "exposureSeconds": "long"}]"#;
        let err = parse_manifest_str(json, Path::new("."), 60.0).unwrap_err();
        assert!(err.to_string().contains("[1].exposureSeconds"), "{err}");
    }

    #[test]
    fn test_parse_from_file_resolves_relative_to_manifest() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"[{"file": "L_0001.tif", "exposureSeconds": 300}]"#)
            .unwrap();

        let subs = parse_manifest(file.path(), 60.0).unwrap();
        assert_eq!(subs[0].path.parent(), file.path().parent());
    }

    #[test]
    fn test_missing_manifest_is_image_not_found() {
        let err = parse_manifest(Path::new("/nonexistent/manifest.json"), 60.0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::ImageNotFound(_))
        ));
    }
}
