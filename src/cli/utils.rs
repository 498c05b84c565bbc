use camino::Utf8Path;
use log::info;
use serde::Serialize;
use simple_error::{SimpleResult, bail};
use unwrap::unwrap;

use crate::filenames::get_settings_filename;

/// Check a required input filename
///
/// Assumes no logger has been configured yet
///
pub fn check_required_filename(filename: &Utf8Path, label: &str) -> SimpleResult<()> {
    if filename.as_str().is_empty() {
        bail!("Must specify {} file", label);
    }
    if !filename.exists() {
        bail!("Can't find specified {} file: '{}'", label, filename);
    }
    if !filename.is_file() {
        bail!(
            "Specified {} file path does not appear to be a file: '{}'",
            label,
            filename
        );
    }
    Ok(())
}

/// Check an optional input filename
///
/// Assumes no logger has been configured yet
///
pub fn check_optional_filename(filename_opt: Option<&Utf8Path>, label: &str) -> SimpleResult<()> {
    if let Some(filename) = filename_opt {
        check_required_filename(filename, label)?;
    }
    Ok(())
}

/// Check a sample or assembler name used to build output filenames
///
pub fn check_unit_name(name: &str, label: &str) -> SimpleResult<()> {
    if name.is_empty() {
        bail!("Must specify {} name", label);
    }
    if name.contains(['/', '\\']) {
        bail!("{} name can't contain a path separator: '{}'", label, name);
    }
    Ok(())
}

/// Write the settings of one unit to the output directory in json format
///
/// * `unit_label` - prefix of the settings filename
///
pub fn write_unit_settings<T: Serialize>(output_dir: &Utf8Path, unit_label: &str, settings: &T) {
    let filename = output_dir.join(get_settings_filename(unit_label));

    info!("Writing {unit_label} settings to file: '{filename}'");

    let f = unwrap!(
        std::fs::File::create(&filename),
        "Unable to create {} settings json file: '{}'",
        unit_label,
        filename
    );

    serde_json::to_writer_pretty(&f, &settings).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn test_check_required_filename() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let filename = dir_path.join("a.paf");

        assert!(check_required_filename(&filename, "alignment").is_err());
        std::fs::write(&filename, "").unwrap();
        assert!(check_required_filename(&filename, "alignment").is_ok());

        // Directories are not accepted as input files
        assert!(check_required_filename(&dir_path, "alignment").is_err());

        assert!(check_optional_filename(None, "reference").is_ok());
        assert!(check_optional_filename(Some(&dir_path.join("b.fa")), "reference").is_err());
    }

    #[test]
    fn test_check_unit_name() {
        assert!(check_unit_name("sample_1", "Sample").is_ok());
        assert!(check_unit_name("", "Sample").is_err());
        assert!(check_unit_name("a/b", "Assembler").is_err());
    }

    #[test]
    fn test_write_unit_settings() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        write_unit_settings(&dir_path, "gaps", &serde_json::json!({"sample": "s1"}));

        let contents = std::fs::read_to_string(dir_path.join("gaps.settings.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["sample"], "s1");
    }
}
