//! Per-OS tool catalogs.
//!
//! A catalog entry names a tool, the executable probed for presence, and
//! how the tool is obtained when absent. URLs and package names are
//! configuration data; the provisioning routine itself never looks at
//! them beyond dispatching on the source kind.

/// How a tool gets onto the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Fetch an archive and unpack it under the install prefix; `bin_dir`
    /// is the unpacked bin directory, relative to the prefix.
    Archive {
        url: &'static str,
        bin_dir: &'static str,
    },
    /// Fetch a platform installer and run it through the host adapter.
    Installer {
        url: &'static str,
        args: &'static [&'static str],
        /// The download requires a license-acceptance cookie from config.
        needs_cookie: bool,
    },
    /// Install through the OS package manager.
    Package { names: &'static [&'static str] },
    /// One shell command, for upstream bootstrap scripts.
    Script { command: &'static str },
}

/// A single catalog entry.
#[derive(Debug, Clone)]
pub struct ToolDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Executable looked up on the host environment's search path.
    pub probe: &'static str,
    pub source: Source,
    /// Absolute directory added to PATH after install, for installers that
    /// drop binaries outside the search path.
    pub path_entry: Option<&'static str>,
}

/// Catalog for an OS name as reported by the host adapter.
pub fn catalog_for(os: &str) -> Vec<ToolDef> {
    match os {
        "linux" => linux_tools(),
        "macos" => macos_tools(),
        "windows" => windows_tools(),
        _ => Vec::new(),
    }
}

pub fn find_tool(os: &str, id: &str) -> Option<ToolDef> {
    catalog_for(os).into_iter().find(|tool| tool.id == id)
}

fn linux_tools() -> Vec<ToolDef> {
    vec![
        ToolDef {
            id: "toolchain",
            name: "GNU toolchain",
            description: "gcc, g++, gfortran and make",
            probe: "g++",
            source: Source::Package {
                names: &["gcc", "g++", "gfortran", "make"],
            },
            path_entry: None,
        },
        ToolDef {
            id: "git",
            name: "Git",
            description: "Version control",
            probe: "git",
            source: Source::Package { names: &["git"] },
            path_entry: None,
        },
        ToolDef {
            id: "ccache",
            name: "ccache",
            description: "Compiler cache",
            probe: "ccache",
            source: Source::Package { names: &["ccache"] },
            path_entry: None,
        },
        ToolDef {
            id: "cmake",
            name: "CMake",
            description: "Build system generator",
            probe: "cmake",
            source: Source::Archive {
                url: "https://cmake.org/files/v3.30/cmake-3.30.2-linux-x86_64.tar.gz",
                bin_dir: "cmake-3.30.2-linux-x86_64/bin",
            },
            path_entry: None,
        },
        ToolDef {
            id: "maven",
            name: "Apache Maven",
            description: "Java build tool",
            probe: "mvn",
            source: Source::Archive {
                url: "https://archive.apache.org/dist/maven/maven-3/3.9.9/binaries/apache-maven-3.9.9-bin.tar.gz",
                bin_dir: "apache-maven-3.9.9/bin",
            },
            path_entry: None,
        },
        ToolDef {
            id: "jdk",
            name: "OpenJDK 17",
            description: "Java development kit",
            probe: "javac",
            source: Source::Package {
                names: &["openjdk-17-jdk"],
            },
            path_entry: None,
        },
        ToolDef {
            id: "rust",
            name: "Rust toolchain",
            description: "rustc and cargo via rustup",
            probe: "rustc",
            source: Source::Script {
                command: "curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh -s -- -y --default-toolchain stable",
            },
            path_entry: None,
        },
    ]
}

fn macos_tools() -> Vec<ToolDef> {
    vec![
        ToolDef {
            id: "clt",
            name: "Xcode command-line tools",
            description: "clang and the macOS SDK",
            probe: "clang",
            source: Source::Script {
                command: "xcode-select --install",
            },
            path_entry: None,
        },
        ToolDef {
            id: "macports",
            name: "MacPorts",
            description: "Package manager backing the `port` primitive",
            probe: "port",
            source: Source::Installer {
                url: "https://distfiles.macports.org/MacPorts/MacPorts-2.10.1-14-Sonoma.pkg",
                args: &[],
                needs_cookie: false,
            },
            path_entry: Some("/opt/local/bin"),
        },
        ToolDef {
            id: "ccache",
            name: "ccache",
            description: "Compiler cache",
            probe: "ccache",
            source: Source::Package { names: &["ccache"] },
            path_entry: None,
        },
        ToolDef {
            id: "cmake",
            name: "CMake",
            description: "Build system generator",
            probe: "cmake",
            source: Source::Archive {
                url: "https://cmake.org/files/v3.30/cmake-3.30.2-macos-universal.tar.gz",
                bin_dir: "cmake-3.30.2-macos-universal/CMake.app/Contents/bin",
            },
            path_entry: None,
        },
        ToolDef {
            id: "maven",
            name: "Apache Maven",
            description: "Java build tool",
            probe: "mvn",
            source: Source::Archive {
                url: "https://archive.apache.org/dist/maven/maven-3/3.9.9/binaries/apache-maven-3.9.9-bin.tar.gz",
                bin_dir: "apache-maven-3.9.9/bin",
            },
            path_entry: None,
        },
        ToolDef {
            id: "oracle-jdk",
            name: "Oracle JDK",
            description: "Java development kit (license cookie required)",
            probe: "javac",
            source: Source::Installer {
                url: "https://download.oracle.com/java/17/latest/jdk-17_macos-x64_bin.dmg",
                args: &[],
                needs_cookie: true,
            },
            path_entry: None,
        },
    ]
}

fn windows_tools() -> Vec<ToolDef> {
    vec![
        ToolDef {
            id: "toolchain",
            name: "MinGW-w64 toolchain",
            description: "gcc and g++ for Windows",
            probe: "g++",
            source: Source::Package {
                names: &["BrechtSanders.WinLibs.POSIX.UCRT"],
            },
            path_entry: None,
        },
        ToolDef {
            id: "cmake",
            name: "CMake",
            description: "Build system generator",
            probe: "cmake",
            source: Source::Archive {
                url: "https://cmake.org/files/v3.30/cmake-3.30.2-windows-x86_64.zip",
                bin_dir: r"cmake-3.30.2-windows-x86_64\bin",
            },
            path_entry: None,
        },
        ToolDef {
            id: "sevenzip",
            name: "7-Zip",
            description: "Archive tool used by other installers",
            probe: "7z",
            source: Source::Installer {
                url: "https://www.7-zip.org/a/7z2408-x64.exe",
                args: &["/S"],
                needs_cookie: false,
            },
            path_entry: Some(r"C:\Program Files\7-Zip"),
        },
        ToolDef {
            id: "git",
            name: "Git",
            description: "Version control",
            probe: "git",
            source: Source::Package {
                names: &["Git.Git"],
            },
            path_entry: None,
        },
        ToolDef {
            id: "jdk",
            name: "Microsoft OpenJDK 17",
            description: "Java development kit",
            probe: "javac",
            source: Source::Package {
                names: &["Microsoft.OpenJDK.17"],
            },
            path_entry: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPORTED: &[&str] = &["linux", "macos", "windows"];

    #[test]
    fn test_every_os_has_a_catalog() {
        for os in SUPPORTED {
            assert!(!catalog_for(os).is_empty(), "empty catalog for {os}");
        }
        assert!(catalog_for("plan9").is_empty());
    }

    #[test]
    fn test_tool_ids_are_unique_per_os() {
        for os in SUPPORTED {
            let catalog = catalog_for(os);
            let mut ids: Vec<_> = catalog.iter().map(|t| t.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), catalog.len(), "duplicate tool id on {os}");
        }
    }

    #[test]
    fn test_probes_and_names_are_set() {
        for os in SUPPORTED {
            for tool in catalog_for(os) {
                assert!(!tool.probe.is_empty(), "{}: empty probe", tool.id);
                assert!(!tool.name.is_empty(), "{}: empty name", tool.id);
            }
        }
    }

    #[test]
    fn test_archive_sources_carry_bin_dir() {
        for os in SUPPORTED {
            for tool in catalog_for(os) {
                if let Source::Archive { bin_dir, url } = tool.source {
                    assert!(!bin_dir.is_empty(), "{}: empty bin_dir", tool.id);
                    assert!(url.starts_with("https://"), "{}: odd url", tool.id);
                }
            }
        }
    }

    #[test]
    fn test_find_tool() {
        let cmake = find_tool("linux", "cmake").unwrap();
        assert_eq!(cmake.probe, "cmake");
        assert!(find_tool("linux", "no-such-tool").is_none());
    }

    #[test]
    fn test_every_os_ships_a_compiler() {
        for os in SUPPORTED {
            let has_compiler = catalog_for(os)
                .iter()
                .any(|tool| matches!(tool.probe, "g++" | "gcc" | "clang"));
            assert!(has_compiler, "no compiler entry on {os}");
        }
    }

    #[test]
    fn test_cookie_gated_tool_exists() {
        // The one entry exercising the license-cookie path.
        let jdk = find_tool("macos", "oracle-jdk").unwrap();
        assert!(matches!(
            jdk.source,
            Source::Installer {
                needs_cookie: true,
                ..
            }
        ));
    }
}
