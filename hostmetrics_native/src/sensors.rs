//! Thermal Sensors
//!
//! On Linux readings come straight from the hwmon tree so that `high` is the
//! sensor's `tempN_max` threshold. Other platforms go through `sysinfo`,
//! which exposes no max threshold.

use std::path::Path;

/// One sensor reading in degrees Celsius.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub key: String,
    pub temperature: f32,
    pub high: f32,
    pub critical: f32,
}

/// `"coretemp Package id 0"` -> `"coretemp_package_id_0"`.
pub fn format_sensor_key(label: &str) -> String {
    label.trim().replace(' ', "_").to_lowercase()
}

/// A hwmon value in millidegrees, converted to degrees.
fn read_millidegrees(path: &Path) -> Option<f32> {
    let raw = std::fs::read_to_string(path).ok()?;
    let value = raw.trim().parse::<f64>().ok()? / 1000.0;
    value.is_finite().then_some(value as f32)
}

fn read_trimmed(path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Indices `N` of every `tempN_input` file in `dir`, ascending.
fn temp_indices(dir: &Path) -> Vec<u32> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut indices: Vec<u32> = entries
        .filter_map(|entry| {
            let name = entry.ok()?.file_name();
            let name = name.to_str()?;
            name.strip_prefix("temp")?
                .strip_suffix("_input")?
                .parse()
                .ok()
        })
        .collect();
    indices.sort_unstable();
    indices
}

/// Readings of one hwmon chip directory. Attributes live either in the chip
/// directory itself or, on older kernels, in its `device` subdirectory.
fn read_chip(chip: &Path) -> Vec<SensorReading> {
    let chip_name = read_trimmed(&chip.join("name")).unwrap_or_else(|| {
        chip.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let mut dir = chip.to_path_buf();
    let mut indices = temp_indices(&dir);
    if indices.is_empty() {
        dir = chip.join("device");
        indices = temp_indices(&dir);
    }

    indices
        .into_iter()
        .filter_map(|n| {
            let temperature = read_millidegrees(&dir.join(format!("temp{n}_input")))?;
            let key = match read_trimmed(&dir.join(format!("temp{n}_label"))) {
                Some(label) => format_sensor_key(&format!("{chip_name} {label}")),
                None => format_sensor_key(&chip_name),
            };
            Some(SensorReading {
                key,
                temperature,
                high: read_millidegrees(&dir.join(format!("temp{n}_max"))).unwrap_or(0.0),
                critical: read_millidegrees(&dir.join(format!("temp{n}_crit"))).unwrap_or(0.0),
            })
        })
        .collect()
}

/// Every sensor with a current reading under a hwmon class directory such
/// as `/sys/class/hwmon`. Missing thresholds are reported as `0.0`.
pub fn read_hwmon(root: &Path) -> Vec<SensorReading> {
    let Ok(entries) = std::fs::read_dir(root) else {
        log::debug!("temperatures: {} not readable", root.display());
        return Vec::new();
    };
    let mut chips: Vec<_> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    chips.sort();

    chips.iter().flat_map(|chip| read_chip(chip)).collect()
}

#[cfg(target_os = "linux")]
pub fn temperatures() -> Vec<SensorReading> {
    read_hwmon(Path::new("/sys/class/hwmon"))
}

/// Components without a current reading are skipped. `sysinfo` has no max
/// threshold on these platforms, so `high` is always `0.0`.
#[cfg(not(target_os = "linux"))]
pub fn temperatures() -> Vec<SensorReading> {
    let components = sysinfo::Components::new_with_refreshed_list();

    components
        .list()
        .iter()
        .filter_map(|component| {
            let temperature = component.temperature().filter(|t| t.is_finite())?;
            Some(SensorReading {
                key: format_sensor_key(component.label()),
                temperature,
                high: 0.0,
                critical: component.critical().filter(|t| t.is_finite()).unwrap_or(0.0),
            })
        })
        .collect()
}
