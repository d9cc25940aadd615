//! Reserved property keys

/// List of source descriptors driving resolution
pub const CONFIG: &str = "keys.config";

/// Raw bytes of the committed source
pub const CONFIG_DATA: &str = "keys.configdata";

/// Descriptor of the committed source
pub const CONFIG_PATH: &str = "keys.configpath";

/// Presence triggers a dump of the resolved store
pub const HELP: &str = "keys.help";

/// Mode list
pub const ENABLE: &str = "enable";

/// Prefix of per-mode overlay subtrees (`mods.<mode>`)
pub const MODS: &str = "mods";

/// Working directory applied during bootstrap
pub const WORKDIR: &str = "workdir";

/// Key of the overlay subtree for `mode`
pub fn mode_key(mode: &str) -> String {
    format!("{}.{}", MODS, mode)
}
