//! Query tokens - the atomic units of rendered output.
//!
//! Plans are turned into a [`TokenStream`] first and serialized in one pass,
//! so keyword spelling lives in exactly one place.

/// Every element a rendered query can contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // === Keywords ===
    Select,
    From,
    Where,
    OrderBy,
    Desc,
    Limit,
    AllRows,
    ForView,
    ForReference,
    ForUpdate,

    // === Punctuation ===
    Comma,
    Dot,
    LParen,
    RParen,

    // === Whitespace ===
    Space,
    Newline,

    // === Dynamic Content ===
    /// Entity, relationship or field name, emitted as-is.
    Ident(String),
    /// Unsigned integer literal (LIMIT values).
    Number(u64),
    /// Line comment, rendered as `-- text`.
    Comment(String),

    // === Escape Hatch ===
    /// Opaque text passed through unchanged: filter expressions and
    /// field expressions such as `COUNT(Id)`.
    Raw(String),
}

impl Token {
    pub fn serialize(&self) -> String {
        match self {
            Token::Select => "SELECT".into(),
            Token::From => "FROM".into(),
            Token::Where => "WHERE".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::Desc => "DESC".into(),
            Token::Limit => "LIMIT".into(),
            Token::AllRows => "ALL ROWS".into(),
            Token::ForView => "FOR VIEW".into(),
            Token::ForReference => "FOR REFERENCE".into(),
            Token::ForUpdate => "FOR UPDATE".into(),

            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            Token::Space => " ".into(),
            Token::Newline => "\n".into(),

            Token::Ident(s) => s.clone(),
            Token::Number(n) => n.to_string(),
            Token::Comment(text) => format!("-- {}", text),

            Token::Raw(s) => s.clone(),
        }
    }
}

/// A stream of tokens that serializes to query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Append `items` separated by `, `.
    pub fn comma_separated(&mut self, items: Vec<TokenStream>) -> &mut Self {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.comma().space();
            }
            self.append(item);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn serialize(&self) -> String {
        self.tokens.iter().map(Token::serialize).collect()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}
