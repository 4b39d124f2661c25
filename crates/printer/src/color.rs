use termcolor::{Color, ColorSpec, ParseColorError};

/// Returns a default set of color specifications.
///
/// The choices here are meant to be fairly conservative so that they work
/// across terminal themes. Additional specifications can be layered on top;
/// later specifications override earlier ones.
pub fn default_color_specs() -> Vec<UserColorSpec> {
    vec![
        "path:fg:magenta".parse().unwrap(),
        "line:fg:green".parse().unwrap(),
        "match:fg:red".parse().unwrap(),
        "match:style:bold".parse().unwrap(),
    ]
}

/// An error that can occur when parsing a color specification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ColorError {
    /// An unrecognized output component, e.g. neither `path`, `line`,
    /// `column` nor `match`.
    UnrecognizedOutType(String),
    /// An unrecognized attribute, e.g. neither `fg`, `bg`, `style` nor
    /// `none`.
    UnrecognizedSpecType(String),
    /// An unrecognized color name or malformed extended color value.
    UnrecognizedColor(String, String),
    /// An unrecognized style instruction.
    UnrecognizedStyle(String),
    /// The overall `component:attr:value` shape was violated.
    InvalidFormat(String),
}

impl std::error::Error for ColorError {}

impl ColorError {
    fn from_parse_error(err: ParseColorError) -> ColorError {
        ColorError::UnrecognizedColor(err.invalid().to_string(), err.to_string())
    }
}

impl std::fmt::Display for ColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            ColorError::UnrecognizedOutType(ref name) => write!(
                f,
                "unrecognized output type '{}'. Choose from: \
                 path, line, column, match.",
                name,
            ),
            ColorError::UnrecognizedSpecType(ref name) => write!(
                f,
                "unrecognized spec type '{}'. Choose from: fg, bg, style, none.",
                name,
            ),
            ColorError::UnrecognizedColor(_, ref msg) => write!(f, "{}", msg),
            ColorError::UnrecognizedStyle(ref name) => write!(
                f,
                "unrecognized style attribute '{}'. Choose from: \
                 nobold, bold, nointense, intense, nounderline, underline.",
                name,
            ),
            ColorError::InvalidFormat(ref original) => write!(
                f,
                "invalid color spec format: '{}'. Valid format is \
                 '(path|line|column|match):(fg|bg|style):(value)'.",
                original,
            ),
        }
    }
}

/// A merged set of color specifications, one per output component.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ColorSpecs {
    path: ColorSpec,
    line: ColorSpec,
    column: ColorSpec,
    matched: ColorSpec,
}

/// A single color specification as supplied by the user, e.g. via
/// `--colors`.
///
/// The format is a triple `{component}:{attr}:{value}` where `component` is
/// one of `path`, `line`, `column` or `match`; `attr` is one of `fg`, `bg`,
/// `style` or `none`; and `value` is a color name or style instruction
/// (omitted when `attr` is `none`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserColorSpec {
    ty: OutType,
    value: SpecValue,
}

impl UserColorSpec {
    /// Convert this user-provided spec into a plain `termcolor::ColorSpec`,
    /// discarding which output component it targets.
    pub fn to_color_spec(&self) -> ColorSpec {
        let mut spec = ColorSpec::default();
        self.value.merge_into(&mut spec);
        spec
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum SpecValue {
    None,
    Fg(Color),
    Bg(Color),
    Style(Style),
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum OutType {
    Path,
    Line,
    Column,
    Match,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum SpecType {
    Fg,
    Bg,
    Style,
    None,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Style {
    Bold,
    NoBold,
    Intense,
    NoIntense,
    Underline,
    NoUnderline,
}

impl ColorSpecs {
    /// Merge a sequence of user-provided specs into one `ColorSpecs`. Later
    /// entries override earlier ones for the same component.
    pub fn new(specs: &[UserColorSpec]) -> ColorSpecs {
        let mut merged = ColorSpecs::default();
        for spec in specs {
            let target = match spec.ty {
                OutType::Path => &mut merged.path,
                OutType::Line => &mut merged.line,
                OutType::Column => &mut merged.column,
                OutType::Match => &mut merged.matched,
            };
            spec.value.merge_into(target);
        }
        merged
    }

    /// The default color scheme, used when `--color` is enabled and no
    /// `--colors` overrides were given.
    pub fn default_with_color() -> ColorSpecs {
        ColorSpecs::new(&default_color_specs())
    }

    /// The color specification for file paths.
    pub fn path(&self) -> &ColorSpec {
        &self.path
    }

    /// The color specification for line numbers.
    pub fn line(&self) -> &ColorSpec {
        &self.line
    }

    /// The color specification for column numbers.
    pub fn column(&self) -> &ColorSpec {
        &self.column
    }

    /// The color specification for matched text.
    pub fn matched(&self) -> &ColorSpec {
        &self.matched
    }
}

impl SpecValue {
    fn merge_into(&self, cspec: &mut ColorSpec) {
        match *self {
            SpecValue::None => cspec.clear(),
            SpecValue::Fg(ref color) => {
                cspec.set_fg(Some(color.clone()));
            }
            SpecValue::Bg(ref color) => {
                cspec.set_bg(Some(color.clone()));
            }
            SpecValue::Style(ref style) => match *style {
                Style::Bold => {
                    cspec.set_bold(true);
                }
                Style::NoBold => {
                    cspec.set_bold(false);
                }
                Style::Intense => {
                    cspec.set_intense(true);
                }
                Style::NoIntense => {
                    cspec.set_intense(false);
                }
                Style::Underline => {
                    cspec.set_underline(true);
                }
                Style::NoUnderline => {
                    cspec.set_underline(false);
                }
            },
        }
    }
}

impl std::str::FromStr for UserColorSpec {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<UserColorSpec, ColorError> {
        let pieces: Vec<&str> = s.split(':').collect();
        if pieces.len() <= 1 || pieces.len() > 3 {
            return Err(ColorError::InvalidFormat(s.to_string()));
        }
        let otype: OutType = pieces[0].parse()?;
        match pieces[1].parse()? {
            SpecType::None => Ok(UserColorSpec { ty: otype, value: SpecValue::None }),
            SpecType::Style => {
                if pieces.len() < 3 {
                    return Err(ColorError::InvalidFormat(s.to_string()));
                }
                let style: Style = pieces[2].parse()?;
                Ok(UserColorSpec { ty: otype, value: SpecValue::Style(style) })
            }
            SpecType::Fg => {
                if pieces.len() < 3 {
                    return Err(ColorError::InvalidFormat(s.to_string()));
                }
                let color: Color =
                    pieces[2].parse().map_err(ColorError::from_parse_error)?;
                Ok(UserColorSpec { ty: otype, value: SpecValue::Fg(color) })
            }
            SpecType::Bg => {
                if pieces.len() < 3 {
                    return Err(ColorError::InvalidFormat(s.to_string()));
                }
                let color: Color =
                    pieces[2].parse().map_err(ColorError::from_parse_error)?;
                Ok(UserColorSpec { ty: otype, value: SpecValue::Bg(color) })
            }
        }
    }
}

impl std::str::FromStr for OutType {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<OutType, ColorError> {
        match &*s.to_lowercase() {
            "path" => Ok(OutType::Path),
            "line" => Ok(OutType::Line),
            "column" => Ok(OutType::Column),
            "match" => Ok(OutType::Match),
            _ => Err(ColorError::UnrecognizedOutType(s.to_string())),
        }
    }
}

impl std::str::FromStr for SpecType {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<SpecType, ColorError> {
        match &*s.to_lowercase() {
            "fg" => Ok(SpecType::Fg),
            "bg" => Ok(SpecType::Bg),
            "style" => Ok(SpecType::Style),
            "none" => Ok(SpecType::None),
            _ => Err(ColorError::UnrecognizedSpecType(s.to_string())),
        }
    }
}

impl std::str::FromStr for Style {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Style, ColorError> {
        match &*s.to_lowercase() {
            "bold" => Ok(Style::Bold),
            "nobold" => Ok(Style::NoBold),
            "intense" => Ok(Style::Intense),
            "nointense" => Ok(Style::NoIntense),
            "underline" => Ok(Style::Underline),
            "nounderline" => Ok(Style::NoUnderline),
            _ => Err(ColorError::UnrecognizedStyle(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_in_order() {
        let specs: &[UserColorSpec] = &[
            "match:fg:blue".parse().unwrap(),
            "match:none".parse().unwrap(),
            "match:style:bold".parse().unwrap(),
        ];
        let merged = ColorSpecs::new(specs);
        let mut expect = ColorSpec::new();
        expect.set_bold(true);
        assert_eq!(merged.matched(), &expect);
    }

    #[test]
    fn parse_fg_bg_style() {
        let spec: UserColorSpec = "path:fg:blue".parse().unwrap();
        assert_eq!(spec.to_color_spec().fg(), Some(&Color::Blue));

        let spec: UserColorSpec = "match:bg:0xff,0x7f,0x00".parse().unwrap();
        assert_eq!(spec.to_color_spec().bg(), Some(&Color::Rgb(0xFF, 0x7F, 0x00)));

        let spec: UserColorSpec = "column:none".parse().unwrap();
        assert_eq!(spec.to_color_spec(), ColorSpec::default());
    }

    #[test]
    fn errors() {
        assert!(matches!(
            "".parse::<UserColorSpec>(),
            Err(ColorError::InvalidFormat(_))
        ));
        assert!(matches!(
            "foo:fg:red".parse::<UserColorSpec>(),
            Err(ColorError::UnrecognizedOutType(_))
        ));
        assert!(matches!(
            "path:nope:red".parse::<UserColorSpec>(),
            Err(ColorError::UnrecognizedSpecType(_))
        ));
        assert!(matches!(
            "path:style:italic".parse::<UserColorSpec>(),
            Err(ColorError::UnrecognizedStyle(_))
        ));
    }
}
