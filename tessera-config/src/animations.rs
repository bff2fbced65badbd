#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animations {
    #[knuffel(child)]
    pub off: bool,
    #[knuffel(child, unwrap(argument), default = 150)]
    pub window_fade_in_ms: u32,
    #[knuffel(child, unwrap(argument), default = 200)]
    pub suggestion_ms: u32,
}

impl Default for Animations {
    fn default() -> Self {
        Self {
            off: false,
            window_fade_in_ms: 150,
            suggestion_ms: 200,
        }
    }
}
