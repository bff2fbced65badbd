#[derive(knuffel::Decode, Debug, Clone, PartialEq)]
pub struct Output {
    #[knuffel(argument)]
    pub name: String,
    #[knuffel(child)]
    pub size: Option<OutputSize>,
    #[knuffel(child)]
    pub position: Option<Position>,
    #[knuffel(child, unwrap(argument))]
    pub scale: Option<f64>,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            name: String::new(),
            size: None,
            position: None,
            scale: None,
        }
    }
}

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSize {
    #[knuffel(argument)]
    pub width: u16,
    #[knuffel(argument)]
    pub height: u16,
}

#[derive(knuffel::Decode, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    #[knuffel(property)]
    pub x: i32,
    #[knuffel(property)]
    pub y: i32,
}
