//! Marker tables and the token classifier for the script format.

/// Opens a single-line comment.
pub const COMMENT: &str = "#";

/// Opens a bulk comment. Checked before [`COMMENT`] since it shares the prefix.
pub const BULK_COMMENT_OPEN: &str = "##!";

/// Closes a bulk comment.
pub const BULK_COMMENT_CLOSE: &str = "!##";

/// Prefix shared by every directive token.
pub const DIRECTIVE_PREFIX: &str = "@";

/// Prefix shared by every annotation token.
pub const ANNOTATION_PREFIX: &str = "*";

/// Category of a single whitespace-delimited token, decided by its leading characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// `*`-prefixed token, e.g. `*[@]`.
    Annotation,
    /// Empty or all-whitespace text.
    Blank,
    /// `!##`-prefixed token.
    BulkCommentClose,
    /// `##!`-prefixed token.
    BulkCommentOpen,
    /// `#`-prefixed token that is not a bulk comment opener.
    Comment,
    /// `@`-prefixed token, e.g. `@start`.
    Directive,
    /// Anything else: stored verbatim as an entry.
    Raw,
}

/// Classify a token by its leading characters.
/// Longer markers win over shorter ones sharing a prefix.
pub fn classify(token: &str) -> TokenClass {
    if token.trim().is_empty() {
        return TokenClass::Blank;
    }
    if token.starts_with(BULK_COMMENT_OPEN) {
        return TokenClass::BulkCommentOpen;
    }
    if token.starts_with(BULK_COMMENT_CLOSE) {
        return TokenClass::BulkCommentClose;
    }
    if token.starts_with(COMMENT) {
        return TokenClass::Comment;
    }
    if token.starts_with(DIRECTIVE_PREFIX) {
        return TokenClass::Directive;
    }
    if token.starts_with(ANNOTATION_PREFIX) {
        return TokenClass::Annotation;
    }
    return TokenClass::Raw;
}

/// Root commands delimiting the extraction region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `@start`: begin collecting entries. Exactly one per document.
    Start,
    /// `@stop`: stop collecting. Optional; end of input is implied otherwise.
    Stop,
}

impl Directive {
    /// Every directive, in declaration order.
    pub const ALL: [Self; 2] = [Self::Start, Self::Stop];

    /// Look up a directive by its full spelling, prefix included.
    pub fn from_token(token: &str) -> Option<Self> {
        return Self::ALL.into_iter().find(|d| return d.spelling() == token);
    }

    /// The literal token spelling, e.g. `@start`.
    pub const fn spelling(self) -> &'static str {
        return match self {
            Self::Start => "@start",
            Self::Stop => "@stop",
        };
    }
}

/// The closed set of `*[id]` annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    /// `*[*]` stores an entry starting with `*`.
    AnnotationSymbol,
    /// `*[_]` stores a single space.
    Blank,
    /// `*[#]` stores an entry starting with `#`.
    CommentSymbol,
    /// `*[}}]` closes a grouped entry.
    GroupClose,
    /// `*[{{]` opens a grouped entry.
    GroupOpen,
    /// `*[@]` stores an entry starting with `@`.
    RootSymbol,
    /// `*[^+]` stores the rest of the physical line as one entry.
    StoreLine,
}

impl AnnotationKind {
    /// Every annotation, in the order the reference documentation lists them.
    pub const ALL: [Self; 7] = [
        Self::RootSymbol,
        Self::CommentSymbol,
        Self::AnnotationSymbol,
        Self::Blank,
        Self::StoreLine,
        Self::GroupOpen,
        Self::GroupClose,
    ];

    /// Look up an annotation by the id found between the brackets.
    pub fn from_id(id: &str) -> Option<Self> {
        return Self::ALL.into_iter().find(|kind| return kind.id() == id);
    }

    /// The id written between `*[` and `]`.
    pub const fn id(self) -> &'static str {
        return match self {
            Self::AnnotationSymbol => "*",
            Self::Blank => "_",
            Self::CommentSymbol => "#",
            Self::GroupClose => "}}",
            Self::GroupOpen => "{{",
            Self::RootSymbol => "@",
            Self::StoreLine => "^+",
        };
    }

    /// The fixed text substituted for single-token annotations.
    /// `None` for annotations that consume more than their own token.
    pub const fn literal(self) -> Option<&'static str> {
        return match self {
            Self::AnnotationSymbol => Some("*"),
            Self::Blank => Some(" "),
            Self::CommentSymbol => Some("#"),
            Self::RootSymbol => Some("@"),
            Self::GroupClose | Self::GroupOpen | Self::StoreLine => None,
        };
    }

    /// The complete marker token, e.g. `*[}}]`.
    pub fn marker(self) -> String {
        return format!("{ANNOTATION_PREFIX}[{}]", self.id());
    }
}
