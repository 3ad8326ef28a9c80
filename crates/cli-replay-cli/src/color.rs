//! Diagnostic color control
//!
//! Precedence: `CLI_REPLAY_COLOR` (`on`/`off`) overrides everything; absent
//! that, `NO_COLOR` (any value) disables color; absent that, color follows
//! whether stderr is a TTY.

use std::io::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colorizer {
    enabled: bool,
}

impl Colorizer {
    pub fn from_env() -> Self {
        let enabled = match std::env::var("CLI_REPLAY_COLOR").as_deref() {
            Ok("on") => true,
            Ok("off") => false,
            _ => std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal(),
        };
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn red(&self, s: &str) -> String {
        self.wrap(s, "31")
    }

    pub fn green(&self, s: &str) -> String {
        self.wrap(s, "32")
    }

    fn wrap(&self, s: &str, code: &str) -> String {
        if self.enabled {
            format!("\x1b[{}m{}\x1b[0m", code, s)
        } else {
            s.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_off_passes_text_through_unchanged() {
        let c = Colorizer { enabled: false };
        assert_eq!(c.red("fail"), "fail");
    }

    #[test]
    fn color_on_wraps_with_ansi_codes() {
        let c = Colorizer { enabled: true };
        assert_eq!(c.green("ok"), "\x1b[32mok\x1b[0m");
    }
}
