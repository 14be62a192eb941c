//! Scanner for initialized top-level declarations.
//!
//! Recognises `[qualifiers] TYPE NAME [ '[' N? ']' ] = INITIALIZER ;` in a
//! token stream and parses the initializer with a restricted grammar:
//!
//! ```text
//! value    := '-'? INT | IDENT | '&' IDENT | STRING+ | '{' elements '}'
//! elements := ( element ( ',' element )* ','? )?
//! element  := ( '.' IDENT '=' )? value
//! ```
//!
//! A candidate whose initializer does not fit is skipped and scanning
//! resumes at the next token, which tolerates the duplicated declaration
//! heads generated code leaves behind after preprocessor lines are removed.

use crate::error::BackendError;
use crate::lexer::{Token, TokenKind};

/// Maximum nesting of brace lists.
const MAX_DEPTH: usize = 32;

/// An initializer value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    /// Bare identifier, including `NULL` and enum-like tags.
    Ident(String),
    /// `&name`.
    AddressOf(String),
    /// Adjacent string literals, concatenated.
    Str(String),
    /// Brace-enclosed list.
    List(Vec<Element>),
}

/// One entry of a brace list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Field name for `.field = value` entries.
    pub designator: Option<String>,
    pub value: Value,
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Value::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Name of the declaration this value points at, for `name` or `&name`.
    ///
    /// `NULL` is not a reference.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Value::Ident(name) | Value::AddressOf(name) if name != "NULL" => Some(name),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Element]> {
        match self {
            Value::List(elements) => Some(elements),
            _ => None,
        }
    }

    /// Member of a brace list by designator, or by `position` when the list
    /// has no designators at all.
    pub fn member(&self, name: &str, position: usize) -> Option<&Value> {
        let elements = self.as_list()?;
        if elements.iter().any(|e| e.designator.is_some()) {
            elements
                .iter()
                .rev()
                .find(|e| e.designator.as_deref() == Some(name))
                .map(|e| &e.value)
        } else {
            elements.get(position).map(|e| &e.value)
        }
    }

    /// Designated member only.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_list()?
            .iter()
            .rev()
            .find(|e| e.designator.as_deref() == Some(name))
            .map(|e| &e.value)
    }

    /// Elements of a flat integer list.
    ///
    /// Returns the index of the first element that is not an integer as the error.
    pub fn ints(&self) -> Result<Vec<i64>, usize> {
        let elements = self.as_list().ok_or(0usize)?;
        elements
            .iter()
            .enumerate()
            .map(|(i, e)| e.value.as_int().ok_or(i))
            .collect()
    }
}

/// A successfully parsed declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Qualifiers before the type (`static`, `const`, attribute macros).
    pub qualifiers: Vec<String>,
    pub type_name: String,
    pub name: String,
    /// Declared with `[]` or `[N]`.
    pub is_array: bool,
    pub value: Value,
    /// Line of the first token.
    pub line: usize,
}

impl Declaration {
    /// Returns true if the declaration carries `qualifier` (e.g., `"static"`).
    pub fn has_qualifier(&self, qualifier: &str) -> bool {
        self.qualifiers.iter().any(|q| q == qualifier)
    }
}

/// A candidate declaration that was abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub name: String,
    pub line: usize,
    pub reason: String,
}

/// Output of [`scan_declarations`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub declarations: Vec<Declaration>,
    pub skipped: Vec<Skipped>,
}

impl Scan {
    /// Last declaration named `name`.
    pub fn by_name(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().rev().find(|d| d.name == name)
    }

    /// Last declaration whose type is `type_name`.
    pub fn by_type(&self, type_name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .rev()
            .find(|d| d.type_name == type_name)
    }
}

/// Find every initialized declaration in `tokens`.
pub fn scan_declarations(tokens: &[Token]) -> Scan {
    let mut scan = Scan::default();
    let mut pos = 0;

    while pos < tokens.len() {
        let Some(head) = declaration_head(tokens, pos) else {
            pos += 1;
            continue;
        };

        let mut cursor = head.init_start;
        let parsed = parse_value(tokens, &mut cursor, 0).and_then(|value| {
            expect_punct(tokens, &mut cursor, ';')?;
            Ok(value)
        });
        match parsed {
            Ok(value) => {
                let (type_name, qualifiers) = match head.idents.split_last() {
                    Some((type_name, qualifiers)) => (type_name.clone(), qualifiers.to_vec()),
                    None => (String::new(), Vec::new()),
                };
                scan.declarations.push(Declaration {
                    qualifiers,
                    type_name,
                    name: head.name,
                    is_array: head.is_array,
                    value,
                    line: tokens[pos].line,
                });
                pos = cursor;
            }
            Err(e) => {
                scan.skipped.push(Skipped {
                    name: head.name,
                    line: tokens[pos].line,
                    reason: e.to_string(),
                });
                pos += 1;
            }
        }
    }

    scan
}

/// Qualifiers + type, name, array marker, and where the initializer starts.
struct Head {
    idents: Vec<String>,
    name: String,
    is_array: bool,
    init_start: usize,
}

/// Match `IDENT IDENT+ ( '[' (INT|IDENT)? ']' )? '='` at `start`.
fn declaration_head(tokens: &[Token], start: usize) -> Option<Head> {
    let mut pos = start;
    let mut idents = Vec::new();
    while let Some(name) = tokens.get(pos).and_then(Token::ident) {
        idents.push(name.to_string());
        pos += 1;
    }
    if idents.len() < 2 {
        return None;
    }

    let mut is_array = false;
    if tokens.get(pos)?.is_punct('[') {
        pos += 1;
        if matches!(
            tokens.get(pos)?.kind,
            TokenKind::Int(_) | TokenKind::Ident(_)
        ) {
            pos += 1;
        }
        if !tokens.get(pos)?.is_punct(']') {
            return None;
        }
        pos += 1;
        is_array = true;
    }
    if !tokens.get(pos)?.is_punct('=') {
        return None;
    }

    let name = idents.pop()?;
    Some(Head {
        idents,
        name,
        is_array,
        init_start: pos + 1,
    })
}

fn parse_value(tokens: &[Token], pos: &mut usize, depth: usize) -> Result<Value, BackendError> {
    let token = next(tokens, pos)?;
    match &token.kind {
        TokenKind::Int(v) => Ok(Value::Int(*v)),
        TokenKind::Ident(name) => Ok(Value::Ident(name.clone())),
        TokenKind::Str(s) => {
            let mut text = s.clone();
            while let Some(TokenKind::Str(more)) = tokens.get(*pos).map(|t| &t.kind) {
                text.push_str(more);
                *pos += 1;
            }
            Ok(Value::Str(text))
        }
        TokenKind::Punct('-') => match next(tokens, pos)?.kind {
            TokenKind::Int(v) => Ok(Value::Int(-v)),
            ref other => Err(unexpected(other, token.line, "integer after '-'")),
        },
        TokenKind::Punct('&') => {
            let target = next(tokens, pos)?;
            match target.ident() {
                Some(name) => Ok(Value::AddressOf(name.to_string())),
                None => Err(unexpected(&target.kind, target.line, "identifier after '&'")),
            }
        }
        TokenKind::Punct('{') => parse_list(tokens, pos, depth + 1),
        other => Err(unexpected(other, token.line, "initializer value")),
    }
}

fn parse_list(tokens: &[Token], pos: &mut usize, depth: usize) -> Result<Value, BackendError> {
    if depth > MAX_DEPTH {
        return Err(BackendError::Parse(format!(
            "initializer nested deeper than {MAX_DEPTH} levels"
        )));
    }
    let mut elements = Vec::new();
    loop {
        if peek_punct(tokens, *pos, '}') {
            *pos += 1;
            return Ok(Value::List(elements));
        }

        let designator = if peek_punct(tokens, *pos, '.') {
            *pos += 1;
            let field = next(tokens, pos)?;
            let Some(name) = field.ident() else {
                return Err(unexpected(&field.kind, field.line, "field name after '.'"));
            };
            let name = name.to_string();
            expect_punct(tokens, pos, '=')?;
            Some(name)
        } else {
            None
        };
        let value = parse_value(tokens, pos, depth)?;
        elements.push(Element { designator, value });

        let separator = next(tokens, pos)?;
        match separator.kind {
            TokenKind::Punct(',') => {}
            TokenKind::Punct('}') => return Ok(Value::List(elements)),
            ref other => return Err(unexpected(other, separator.line, "',' or '}'")),
        }
    }
}

fn next<'a>(tokens: &'a [Token], pos: &mut usize) -> Result<&'a Token, BackendError> {
    let token = tokens
        .get(*pos)
        .ok_or_else(|| BackendError::Parse("unexpected end of input in initializer".to_string()))?;
    *pos += 1;
    Ok(token)
}

fn peek_punct(tokens: &[Token], pos: usize, c: char) -> bool {
    tokens.get(pos).is_some_and(|t| t.is_punct(c))
}

fn expect_punct(tokens: &[Token], pos: &mut usize, c: char) -> Result<(), BackendError> {
    let token = next(tokens, pos)?;
    if token.is_punct(c) {
        Ok(())
    } else {
        Err(unexpected(&token.kind, token.line, &format!("'{c}'")))
    }
}

fn unexpected(kind: &TokenKind, line: usize, wanted: &str) -> BackendError {
    let found = match kind {
        TokenKind::Ident(name) => format!("identifier '{name}'"),
        TokenKind::Int(v) => format!("integer {v}"),
        TokenKind::Str(_) => "string literal".to_string(),
        TokenKind::Punct(c) => format!("'{c}'"),
        TokenKind::Invalid(text) => format!("unsupported literal '{text}'"),
    };
    BackendError::Parse(format!("line {line}: expected {wanted}, found {found}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn scan(src: &str) -> Scan {
        scan_declarations(&tokenize(src).tokens)
    }

    #[test]
    fn byte_array() {
        let s = scan("static LV_ATTRIBUTE_LARGE_CONST const uint8_t glyph_bitmap[] = {\n 0x00, 0x1f, 0xff\n};");
        assert_eq!(s.declarations.len(), 1);
        let d = &s.declarations[0];
        assert_eq!(d.type_name, "uint8_t");
        assert_eq!(d.name, "glyph_bitmap");
        assert!(d.is_array);
        assert!(d.has_qualifier("static"));
        assert!(d.has_qualifier("LV_ATTRIBUTE_LARGE_CONST"));
        assert_eq!(d.value.ints(), Ok(vec![0, 31, 255]));
    }

    #[test]
    fn designated_struct_list() {
        let s = scan(
            "static const lv_font_fmt_txt_glyph_dsc_t glyph_dsc[] = {\n\
             {.bitmap_index = 0, .adv_w = 0, .box_w = 0, .box_h = 0, .ofs_x = 0, .ofs_y = 0} /* id = 0 reserved */,\n\
             {.bitmap_index = 0, .adv_w = 69, .box_w = 3, .box_h = 12, .ofs_x = 1, .ofs_y = -1}\n\
             };",
        );
        let d = s.by_type("lv_font_fmt_txt_glyph_dsc_t").unwrap();
        let glyphs = d.value.as_list().unwrap();
        assert_eq!(glyphs.len(), 2);
        let second = &glyphs[1].value;
        assert_eq!(second.field("adv_w"), Some(&Value::Int(69)));
        assert_eq!(second.member("ofs_y", 5), Some(&Value::Int(-1)));
        assert_eq!(second.field("missing"), None);
    }

    #[test]
    fn positional_members() {
        let s = scan("const lv_font_fmt_txt_glyph_dsc_t g[] = { {0, 64, 2, 2, 0, 1}, };");
        let first = &s.declarations[0].value.as_list().unwrap()[0].value;
        assert_eq!(first.member("adv_w", 1), Some(&Value::Int(64)));
        assert_eq!(first.member("ofs_y", 5), Some(&Value::Int(1)));
        assert_eq!(first.field("adv_w"), None);
    }

    #[test]
    fn references_and_tags() {
        let s = scan(
            "static const lv_font_fmt_txt_cmap_t cmaps[] = {\n\
             { .range_start = 32, .unicode_list = NULL, .glyph_id_ofs_list = ofs_list,\n\
               .type = LV_FONT_FMT_TXT_CMAP_FORMAT0_TINY }\n\
             };\n\
             lv_font_t font = { .dsc = &font_dsc, .subpx = LV_FONT_SUBPX_NONE, .user_data = NULL, };",
        );
        assert_eq!(s.declarations.len(), 2);
        let range = &s.by_name("cmaps").unwrap().value.as_list().unwrap()[0].value;
        assert_eq!(range.field("unicode_list").unwrap().reference(), None);
        assert_eq!(
            range.field("glyph_id_ofs_list").unwrap().reference(),
            Some("ofs_list")
        );
        assert_eq!(
            range.field("type").unwrap().as_ident(),
            Some("LV_FONT_FMT_TXT_CMAP_FORMAT0_TINY")
        );
        let font = s.by_type("lv_font_t").unwrap();
        assert_eq!(font.value.field("dsc"), Some(&Value::AddressOf("font_dsc".into())));
        assert!(!font.is_array);
    }

    #[test]
    fn duplicated_heads_resume_on_next_token() {
        let src = "#if LVGL_VERSION_MAJOR >= 8\n\
                   static const lv_font_fmt_txt_dsc_t font_dsc = {\n\
                   #else\n\
                   static lv_font_fmt_txt_dsc_t font_dsc = {\n\
                   #endif\n\
                   .glyph_bitmap = glyph_bitmap, .bpp = 4\n\
                   };";
        let s = scan(src);
        assert_eq!(s.declarations.len(), 1);
        let d = &s.declarations[0];
        assert_eq!(d.type_name, "lv_font_fmt_txt_dsc_t");
        assert_eq!(d.qualifiers, vec!["static".to_string()]);
        assert_eq!(d.line, 4);
        assert_eq!(d.value.field("bpp"), Some(&Value::Int(4)));
        assert!(!s.skipped.is_empty());
        assert_eq!(s.skipped[0].name, "font_dsc");
        assert_eq!(s.skipped[0].line, 2);
    }

    #[test]
    fn bad_initializer_does_not_hide_later_declarations() {
        let s = scan("static const float scale = 1.5; static const int8_t kern[] = {-6, 3};");
        assert_eq!(s.declarations.len(), 1);
        assert_eq!(s.declarations[0].name, "kern");
        assert_eq!(s.declarations[0].value.ints(), Ok(vec![-6, 3]));
        assert!(s.skipped[0].reason.contains("unsupported literal"));
    }

    #[test]
    fn declarations_without_initializer_are_ignored() {
        let s = scan("static lv_font_fmt_txt_glyph_cache_t cache;\nLV_FONT_DECLARE(x);\nint y = 3;");
        assert_eq!(s.declarations.len(), 1);
        assert_eq!(s.declarations[0].name, "y");
        assert_eq!(s.declarations[0].value, Value::Int(3));
    }

    #[test]
    fn sized_arrays_and_strings() {
        let s = scan("const char name[8] = \"ab\" \"cd\";");
        assert_eq!(s.declarations[0].value, Value::Str("abcd".into()));
        assert!(s.declarations[0].is_array);
    }

    #[test]
    fn ints_reports_first_non_integer() {
        let s = scan("int a[] = {1, 2, X};");
        assert_eq!(s.declarations[0].value.ints(), Err(2));
    }

    #[test]
    fn nesting_limit() {
        let deep = format!("int a = {}{};", "{".repeat(40), "}".repeat(40));
        let s = scan(&deep);
        assert!(s.declarations.is_empty());
        assert!(s.skipped[0].reason.contains("nested deeper"));
    }

    #[test]
    fn missing_semicolon_is_skipped() {
        let s = scan("int a = 1 int b = 2;");
        assert_eq!(s.declarations.len(), 1);
        assert_eq!(s.declarations[0].name, "b");
    }
}
