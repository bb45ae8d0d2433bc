use rand::{Rng, thread_rng};

const RESET: &str = "\x1b[0m";

/// One ANSI SGR color. The escape codes go over the wire to the clients,
/// so painting is part of the protocol output, not local styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(&'static str);

pub const RED: Color = Color("\x1b[31m");
pub const GREEN: Color = Color("\x1b[32m");
pub const YELLOW: Color = Color("\x1b[33m");
pub const BLUE: Color = Color("\x1b[34m");
pub const MAGENTA: Color = Color("\x1b[35m");
pub const CYAN: Color = Color("\x1b[36m");

const PALETTE: [Color; 6] = [RED, GREEN, YELLOW, BLUE, MAGENTA, CYAN];

impl Color {
    pub fn paint(&self, text: &str) -> String {
        format!("{}{}{}", self.0, text, RESET)
    }
}

/// Picks the color a client keeps for the lifetime of its connection.
pub fn random() -> Color {
    let i = thread_rng().gen_range(0..PALETTE.len());

    PALETTE[i]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_wraps_and_resets() {
        assert_eq!(RED.paint("hi"), "\x1b[31mhi\x1b[0m");
    }

    #[test]
    fn random_draws_from_the_palette() {
        for _ in 0..32 {
            assert!(PALETTE.contains(&random()));
        }
    }
}
