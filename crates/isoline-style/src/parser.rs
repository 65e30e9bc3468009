//! Palette text parsing using the `cssparser` crate.
//!
//! Each palette line is tokenized as CSS: a number, an optional comma and a
//! color in hex, `rgb()`/`rgba()` or named form.

use cssparser::{
    BasicParseErrorKind, ParseError as CssParseError, ParseErrorKind, Parser, ParserInput, Token,
};
use isoline_render::Color;

use crate::{Error, Result};

/// Parse one `<value> <color>` stop.
///
/// `line` is the 1-based line number reported in errors.
pub fn parse_stop(text: &str, line: u32) -> Result<(f32, Color)> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);

    parser
        .parse_entirely(|p| {
            let value = parse_number(p)?;
            let _ = p.try_parse(|p| p.expect_comma());
            let color = parse_color(p)?;
            Ok::<_, CssParseError<'_, ()>>((value, color))
        })
        .map_err(|e| Error::parse(describe(&e.kind), line, e.location.column))
}

/// Parse a standalone CSS color.
pub fn parse_color_str(text: &str) -> Result<Color> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);

    parser
        .parse_entirely(parse_color)
        .map_err(|e| Error::parse(describe(&e.kind), e.location.line + 1, e.location.column))
}

fn describe(kind: &ParseErrorKind<'_, ()>) -> String {
    match kind {
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
            "expected a value followed by a color".to_string()
        }
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected token {:?}", token)
        }
        ParseErrorKind::Basic(other) => format!("{:?}", other),
        ParseErrorKind::Custom(()) => "invalid value or color".to_string(),
    }
}

fn parse_number<'i>(parser: &mut Parser<'i, '_>) -> std::result::Result<f32, CssParseError<'i, ()>> {
    parser.skip_whitespace();
    let token = parser.next()?.clone();
    match token {
        Token::Number { value, .. } => Ok(value),
        _ => Err(parser.new_custom_error(())),
    }
}

/// Parse a color value.
fn parse_color<'i>(parser: &mut Parser<'i, '_>) -> std::result::Result<Color, CssParseError<'i, ()>> {
    parser.skip_whitespace();

    let token = parser.next()?.clone();

    match token {
        Token::Hash(hash) | Token::IDHash(hash) => {
            let hex_str = format!("#{}", hash);
            Color::from_hex(&hex_str).ok_or_else(|| parser.new_custom_error(()))
        }
        Token::Ident(name) => named_color(&name).ok_or_else(|| parser.new_custom_error(())),
        Token::Function(name)
            if name.eq_ignore_ascii_case("rgb") || name.eq_ignore_ascii_case("rgba") =>
        {
            // rgb(r, g, b) or rgba(r, g, b, a)
            let (r, g, b, a) = parser.parse_nested_block(|p| {
                let r = parse_color_component(p)?;
                p.expect_comma()?;
                let g = parse_color_component(p)?;
                p.expect_comma()?;
                let b = parse_color_component(p)?;
                let a = if p.try_parse(|p| p.expect_comma()).is_ok() {
                    parse_alpha_component(p)?
                } else {
                    1.0
                };
                Ok::<_, CssParseError<'_, ()>>((r, g, b, a))
            })?;
            Ok(Color::from_rgba(r, g, b, a))
        }
        _ => Err(parser.new_custom_error(())),
    }
}

/// A CSS color keyword: the full named-color table plus `transparent`.
fn named_color(name: &str) -> Option<Color> {
    if name.eq_ignore_ascii_case("transparent") {
        return Some(Color::TRANSPARENT);
    }
    let (r, g, b) = cssparser::color::parse_named_color(name).ok()?;
    Some(Color::from_rgb8(r, g, b))
}

fn parse_color_component<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<f32, CssParseError<'i, ()>> {
    parser.skip_whitespace();
    let token = parser.next()?.clone();
    match token {
        Token::Number { value, .. } => Ok((value / 255.0).clamp(0.0, 1.0)),
        Token::Percentage { unit_value, .. } => Ok(unit_value.clamp(0.0, 1.0)),
        _ => Err(parser.new_custom_error(())),
    }
}

fn parse_alpha_component<'i>(
    parser: &mut Parser<'i, '_>,
) -> std::result::Result<f32, CssParseError<'i, ()>> {
    parser.skip_whitespace();
    let token = parser.next()?.clone();
    match token {
        Token::Number { value, .. } => Ok(value.clamp(0.0, 1.0)),
        Token::Percentage { unit_value, .. } => Ok(unit_value.clamp(0.0, 1.0)),
        _ => Err(parser.new_custom_error(())),
    }
}
