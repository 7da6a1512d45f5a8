/// OS and architecture names as the Go release catalog spells them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub os: String,
    pub arch: String,
}

pub fn get_system_info() -> PlatformInfo {
    let os = match std::env::consts::OS {
        "macos" => "darwin".to_string(),
        other => other.to_string(),
    };

    let arch = match std::env::consts::ARCH {
        "x86_64" => "amd64".to_string(),
        "aarch64" => "arm64".to_string(),
        "x86" => "386".to_string(),
        "arm" => "arm".to_string(),
        other => other.to_string(),
    };

    PlatformInfo { os, arch }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_info_uses_go_naming() {
        let info = get_system_info();
        assert!(!info.os.is_empty());
        assert!(!info.arch.is_empty());
        // The Go catalog never uses these spellings
        assert_ne!(info.os, "macos");
        assert_ne!(info.arch, "x86_64");
        assert_ne!(info.arch, "aarch64");
    }
}
