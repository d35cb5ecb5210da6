//! Best-effort reads of host capabilities. Anything unavailable is `None`.

#[cfg(target_os = "linux")]
use std::fs;

/// Logical CPU count.
pub fn hardware_concurrency() -> Option<usize> {
    std::thread::available_parallelism().ok().map(|n| n.get())
}

/// Installed memory in gigabytes, from `/proc/meminfo`.
pub fn device_memory_gb() -> Option<f32> {
    #[cfg(target_os = "linux")]
    {
        fs::read_to_string("/proc/meminfo")
            .ok()
            .as_deref()
            .and_then(parse_meminfo_gb)
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Charge of the first battery under `/sys/class/power_supply`, in `[0, 1]`.
pub fn battery_level() -> Option<f32> {
    #[cfg(target_os = "linux")]
    {
        let supplies = fs::read_dir("/sys/class/power_supply").ok()?;
        supplies.flatten().find_map(|supply| {
            let path = supply.path();
            let kind = fs::read_to_string(path.join("type")).ok()?;
            if kind.trim() != "Battery" {
                return None;
            }
            parse_capacity(&fs::read_to_string(path.join("capacity")).ok()?)
        })
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// `MemTotal` line of a meminfo dump, converted from kB to GB.
pub fn parse_meminfo_gb(meminfo: &str) -> Option<f32> {
    let line = meminfo.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kb: f64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some((kb / (1024.0 * 1024.0)) as f32)
}

/// Percentage from a sysfs `capacity` file.
pub fn parse_capacity(raw: &str) -> Option<f32> {
    let pct: f32 = raw.trim().parse().ok()?;
    Some((pct / 100.0).clamp(0.0, 1.0))
}
