use std::fmt;
use std::str::FromStr;

use crate::error::ZiggyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Os {
    Windows,
    Darwin,
    Linux,
    FreeBsd,
}

impl Os {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::FreeBsd => "freebsd",
        }
    }

    /// Accepts both canonical tokens and the spellings reported by
    /// `uname`, `std::env::consts::OS` and upstream archive names.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "windows" | "win32" => Some(Self::Windows),
            "darwin" | "macos" => Some(Self::Darwin),
            "linux" => Some(Self::Linux),
            "freebsd" => Some(Self::FreeBsd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Arch {
    X86,
    X86_64,
    Aarch64,
    Armv6kz,
    Armv7a,
    Riscv64,
    Powerpc64le,
    Powerpc,
}

impl Arch {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
            Self::Armv6kz => "armv6kz",
            Self::Armv7a => "armv7a",
            Self::Riscv64 => "riscv64",
            Self::Powerpc64le => "powerpc64le",
            Self::Powerpc => "powerpc",
        }
    }

    /// Normalizes host machine names as reported by `uname -m` and friends.
    /// Archive names are never run through this; their aliases are
    /// release-dependent and belong to the resolver.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "x86" | "i386" | "i486" | "i586" | "i686" => Some(Self::X86),
            "x86_64" | "amd64" | "x64" => Some(Self::X86_64),
            "aarch64" | "arm64" => Some(Self::Aarch64),
            "armv6kz" | "armv6" | "armv6l" => Some(Self::Armv6kz),
            "armv7a" | "armv7" | "armv7l" => Some(Self::Armv7a),
            "riscv64" => Some(Self::Riscv64),
            "powerpc64le" | "ppc64le" => Some(Self::Powerpc64le),
            "powerpc" | "ppc" => Some(Self::Powerpc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlatformKey {
    pub os: Os,
    pub arch: Arch,
}

pub(crate) const SUPPORTED_PLATFORMS: &[(Os, Arch)] = &[
    (Os::Windows, Arch::X86),
    (Os::Windows, Arch::X86_64),
    (Os::Windows, Arch::Aarch64),
    (Os::Darwin, Arch::X86_64),
    (Os::Darwin, Arch::Aarch64),
    (Os::Linux, Arch::X86),
    (Os::Linux, Arch::X86_64),
    (Os::Linux, Arch::Aarch64),
    (Os::Linux, Arch::Armv6kz),
    (Os::Linux, Arch::Armv7a),
    (Os::Linux, Arch::Riscv64),
    (Os::Linux, Arch::Powerpc64le),
    (Os::Linux, Arch::Powerpc),
    (Os::FreeBsd, Arch::X86_64),
];

impl PlatformKey {
    pub fn new(os: Os, arch: Arch) -> Result<Self, ZiggyError> {
        if !SUPPORTED_PLATFORMS.contains(&(os, arch)) {
            return Err(ZiggyError::UnsupportedPlatform {
                os: os.as_str().to_string(),
                arch: arch.as_str().to_string(),
            });
        }
        Ok(Self { os, arch })
    }

    pub fn from_raw(os: &str, machine: &str) -> Result<Self, ZiggyError> {
        let unsupported = || ZiggyError::UnsupportedPlatform {
            os: os.trim().to_ascii_lowercase(),
            arch: machine.trim().to_ascii_lowercase(),
        };
        let parsed_os = Os::parse(os).ok_or_else(unsupported)?;
        let parsed_arch = Arch::parse(machine).ok_or_else(unsupported)?;
        Self::new(parsed_os, parsed_arch)
    }

    pub fn detect() -> Result<Self, ZiggyError> {
        Self::from_raw(std::env::consts::OS, host_machine())
    }

    pub fn executable_name(self) -> &'static str {
        match self.os {
            Os::Windows => "zig.exe",
            _ => "zig",
        }
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.as_str(), self.arch.as_str())
    }
}

impl FromStr for PlatformKey {
    type Err = ZiggyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let Some((os, arch)) = input.trim().split_once('-') else {
            return Err(ZiggyError::Config(format!(
                "invalid platform '{input}': expected '<os>-<arch>'"
            )));
        };
        Self::from_raw(os, arch)
    }
}

// `std::env::consts::ARCH` folds every 32-bit ARM and 64-bit PowerPC flavor
// into one token, so the finer distinctions come from the compile target.
fn host_machine() -> &'static str {
    match std::env::consts::ARCH {
        "arm" if cfg!(target_feature = "v7") => "armv7a",
        "arm" => "armv6kz",
        "powerpc64" if cfg!(target_endian = "little") => "powerpc64le",
        other => other,
    }
}
