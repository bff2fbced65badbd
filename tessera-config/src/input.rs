#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input {
    #[knuffel(child, unwrap(argument), default = 2)]
    pub shell_reveal_pointer_threshold: u16,
    #[knuffel(child, unwrap(argument), default = 8)]
    pub shell_reveal_touch_threshold: u16,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            shell_reveal_pointer_threshold: 2,
            shell_reveal_touch_threshold: 8,
        }
    }
}
