use std::fmt::Display;

#[derive(Debug)]
pub enum OlivineError {
    Input(String),
    Geometry(String),
    NameResolution(String),
    Dimension(String),
    Numeric(String),
}

impl Display for OlivineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (err_name, value) = match self {
            OlivineError::Input(v) => ("Input", v),
            OlivineError::Geometry(v) => ("Geometry", v),
            OlivineError::NameResolution(v) => ("Name Resolution", v),
            OlivineError::Dimension(v) => ("Dimension", v),
            OlivineError::Numeric(v) => ("Numeric", v),
        };

        write!(f, "{} error: {}", err_name, value)
    }
}
