#[cfg(test)]
mod tests {
    use crate::config::InputSettings;
    use crate::core::error::AnalysisError;
    use crate::io::loaders::{discover_subframes, filter_from_file_name, SubframeLoader, SubframeSource};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    /// Test that discovery matches the pattern and sorts by name
    #[test]
    fn test_discover_sorted_by_name() {
        let dir = tempdir().unwrap();
        for name in ["L_0003.tif", "L_0001.tif", "L_0002.TIF", "notes.txt", "flat_0001.tif"] {
            touch(dir.path(), name);
        }
        fs::create_dir(dir.path().join("L_0000.tif")).unwrap();

        let subs = discover_subframes(dir.path(), "L_*.tif", 240.0).unwrap();
        let names: Vec<String> = subs.iter().map(|s| s.file_name()).collect();
        assert_eq!(names, vec!["L_0001.tif", "L_0002.TIF", "L_0003.tif"]);
        assert!(subs.iter().all(|s| s.exposure.value() == 240.0));
    }

    #[test]
    fn test_no_match_is_invalid_config() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "notes.txt");
        let err = discover_subframes(dir.path(), "*.tif", 300.0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempdir().unwrap();
        assert!(discover_subframes(&dir.path().join("absent"), "*.tif", 300.0).is_err());
    }

    #[test]
    fn test_filter_from_file_name() {
        assert_eq!(
            filter_from_file_name("Light_M31_300.0s_Bin1_Ha_gain100_0012.tif").as_deref(),
            Some("Ha")
        );
        assert_eq!(filter_from_file_name("M42_FILTER-OIII_0001.fit").as_deref(), Some("OIII"));
        assert_eq!(filter_from_file_name("m42-sii-001.png").as_deref(), Some("SII"));
        assert_eq!(filter_from_file_name("capture_0001.tif"), None);
    }

    #[test]
    fn test_loader_directory_with_filters() {
        let dir = tempdir().unwrap();
        for name in ["M8_Ha_0001.tif", "M8_OIII_0001.tif", "M8_Ha_0002.tif"] {
            touch(dir.path(), name);
        }
        let input = InputSettings {
            dir: dir.path().to_path_buf(),
            analyze_all_filters: true,
            ..InputSettings::default()
        };

        let loaded = SubframeLoader::load(&input).unwrap();
        assert_eq!(loaded.source, SubframeSource::Directory);
        let filters: Vec<Option<&str>> = loaded
            .subframes
            .iter()
            .map(|s| s.filter.as_deref())
            .collect();
        assert_eq!(filters, vec![Some("Ha"), Some("Ha"), Some("OIII")]);
    }

    #[test]
    fn test_loader_prefers_manifest() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "ignored.tif");
        let manifest = dir.path().join("subs.json");
        fs::write(
            &manifest,
            r#"[{"file": "b.tif", "exposureSeconds": 120}, {"file": "a.tif", "exposureSeconds": 60}]"#,
        )
        .unwrap();

        let input = InputSettings {
            dir: dir.path().to_path_buf(),
            manifest: Some(manifest),
            ..InputSettings::default()
        };
        let loaded = SubframeLoader::load(&input).unwrap();
        assert_eq!(loaded.source, SubframeSource::Manifest);
        assert_eq!(loaded.subframes.len(), 2);
        assert_eq!(loaded.subframes[0].file_name(), "b.tif");
        assert_eq!(loaded.subframes[1].exposure.value(), 60.0);
    }

    #[test]
    fn test_empty_manifest_rejected() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("subs.json");
        fs::write(&manifest, "[]").unwrap();
        let input = InputSettings {
            manifest: Some(manifest),
            ..InputSettings::default()
        };
        assert!(SubframeLoader::load(&input).is_err());
    }
}
