#[derive(knuffel::Decode, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Debug {
    /// Damage a small box around every touch point so that it gets drawn.
    #[knuffel(child)]
    pub touch_points: bool,
}
