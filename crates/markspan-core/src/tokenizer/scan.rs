//! Single-rule scanner: splits text into delimiter and text tokens.
//!
//! ```text
//! atoms ──▶ plain stretches / delimiter runs ──▶ pieces ──▶ TagMachine ──▶ tokens
//! ```
//!
//! A delimiter run is a maximal stretch of characters the rule cares about
//! (tag characters plus its escape character). Each run is checked against
//! the rule's spacing policy, split into pieces and fed to a state machine
//! that decides which pieces really delimit a span.

use crate::rule::{CharacterRule, TagKind, TagRole};
use crate::token::{Token, TokenKind};

/// One unit of scanner input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Atom {
    Char(char),
    /// Escaped by an earlier rule; always literal
    Literal(char),
    /// A resolved span hidden from this rule
    Placeholder(usize),
}

impl Atom {
    /// Character seen by the spacing check; placeholders count as text
    fn neighbour(self) -> char {
        match self {
            Atom::Char(c) | Atom::Literal(c) => c,
            Atom::Placeholder(_) => '\u{FFFC}',
        }
    }

    fn is_interesting(self, rule: &CharacterRule) -> bool {
        matches!(self, Atom::Char(c) if rule.is_interesting(c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Literal(String),
    Placeholder(usize),
    Tag(TagRole, String),
    Repeating(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PieceKind {
    Text,
    Open,
    Intermediate,
    Close,
    Repeating,
}

impl Piece {
    fn kind(&self) -> PieceKind {
        match self {
            Piece::Text(_) | Piece::Literal(_) | Piece::Placeholder(_) => PieceKind::Text,
            Piece::Tag(TagRole::Open, _) => PieceKind::Open,
            Piece::Tag(TagRole::Intermediate, _) => PieceKind::Intermediate,
            Piece::Tag(TagRole::Close, _) => PieceKind::Close,
            Piece::Repeating(_) => PieceKind::Repeating,
        }
    }

    fn into_token(self) -> Token {
        match self {
            Piece::Text(text) => Token::text(text),
            Piece::Literal(text) => Token::new(TokenKind::Escape, text),
            Piece::Placeholder(handle) => Token::placeholder(handle),
            Piece::Tag(TagRole::Open, tag) => Token::new(TokenKind::OpenTag, tag),
            Piece::Tag(TagRole::Intermediate, tag) => Token::new(TokenKind::IntermediateTag, tag),
            Piece::Tag(TagRole::Close, tag) => Token::new(TokenKind::CloseTag, tag),
            Piece::Repeating(glyphs) => Token::new(TokenKind::RepeatingTag, glyphs),
        }
    }
}

/// Progress through a candidate span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagState {
    None,
    Open,
    Intermediate,
    Closed,
}

/// What the machine does with the incoming piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Write it straight to the output as literal text
    Emit,
    /// Add it to the span under construction
    Buffer,
    /// Give up on the buffered span and start a new one with this piece
    Restart,
    /// Give up on the buffered span, this piece included
    Abandon,
    /// The piece completes the buffered span
    Complete,
}

fn paired_transition(state: TagState, kind: PieceKind, has_intermediate: bool) -> (TagState, Action) {
    use PieceKind as K;
    use TagState as S;

    match (state, kind) {
        (S::None | S::Closed, K::Open) => (S::Open, Action::Buffer),
        (S::None | S::Closed, _) => (S::None, Action::Emit),
        (S::Open | S::Intermediate, K::Open) => (S::Open, Action::Restart),
        (S::Open, K::Intermediate) if has_intermediate => (S::Intermediate, Action::Buffer),
        (S::Open, K::Close) if has_intermediate => (S::None, Action::Abandon),
        (S::Open, K::Close) => (S::Closed, Action::Complete),
        (S::Open, _) => (S::Open, Action::Buffer),
        (S::Intermediate, K::Close) => (S::Closed, Action::Complete),
        (S::Intermediate, _) => (S::Intermediate, Action::Buffer),
    }
}

fn repeating_transition(state: TagState, kind: PieceKind) -> (TagState, Action) {
    use TagState as S;

    let next = match (state, kind) {
        (S::Open | S::Intermediate, PieceKind::Repeating) => S::Closed,
        (_, PieceKind::Repeating) => S::Open,
        (S::Closed, _) => S::None,
        (state, _) => state,
    };
    (next, Action::Emit)
}

struct TagMachine<'r> {
    rule: &'r CharacterRule,
    state: TagState,
    group: usize,
    output: Vec<Token>,
    pending: Vec<Token>,
}

impl<'r> TagMachine<'r> {
    fn new(rule: &'r CharacterRule) -> Self {
        Self {
            rule,
            state: TagState::None,
            group: 0,
            output: Vec::new(),
            pending: Vec::new(),
        }
    }

    fn step(&mut self, piece: Piece) {
        let kind = piece.kind();
        let token = piece.into_token().with_group(self.group);

        let (state, action) = match self.rule.kind() {
            TagKind::Repeating => repeating_transition(self.state, kind),
            TagKind::Open => {
                paired_transition(self.state, kind, self.rule.intermediate_tag().is_some())
            }
        };
        self.state = state;

        match action {
            Action::Emit if self.rule.kind() == TagKind::Repeating => self.output.push(token),
            Action::Emit => self.output.push(token.into_literal()),
            Action::Buffer => self.pending.push(token),
            Action::Restart => {
                self.abandon();
                self.pending.push(token);
            }
            Action::Abandon => {
                self.abandon();
                self.output.push(token.into_literal());
            }
            Action::Complete => {
                self.pending.push(token);
                self.output.append(&mut self.pending);
            }
        }
    }

    fn abandon(&mut self) {
        self.output
            .extend(self.pending.drain(..).map(Token::into_literal));
    }

    fn push_plain(&mut self, atoms: &[Atom]) {
        let mut pieces: Vec<Piece> = Vec::new();
        for atom in atoms {
            match *atom {
                Atom::Char(c) => match pieces.last_mut() {
                    Some(Piece::Text(text)) => text.push(c),
                    _ => pieces.push(Piece::Text(c.to_string())),
                },
                Atom::Literal(c) => match pieces.last_mut() {
                    Some(Piece::Literal(text)) => text.push(c),
                    _ => pieces.push(Piece::Literal(c.to_string())),
                },
                Atom::Placeholder(handle) => pieces.push(Piece::Placeholder(handle)),
            }
        }
        for piece in pieces {
            self.step(piece);
        }
    }

    fn push_run(&mut self, mut pieces: Vec<Piece>) {
        self.group += 1;

        // Escapes can split one run into several glyph groups; only one of
        // them delimits: the first when closing, the last when opening.
        let repeating: Vec<usize> = pieces
            .iter()
            .enumerate()
            .filter(|(_, piece)| piece.kind() == PieceKind::Repeating)
            .map(|(index, _)| index)
            .collect();
        if repeating.len() > 1 {
            let keep = if self.state == TagState::Open {
                repeating[0]
            } else {
                repeating[repeating.len() - 1]
            };
            for index in repeating.into_iter().filter(|index| *index != keep) {
                let glyphs = match &pieces[index] {
                    Piece::Repeating(glyphs) => glyphs.clone(),
                    _ => continue,
                };
                pieces[index] = Piece::Text(glyphs);
            }
        }

        for piece in pieces {
            self.step(piece);
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.abandon();
        self.output
    }
}

/// Break a delimiter run into pieces
fn split_run(run: &[char], rule: &CharacterRule, allowed: bool) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut text = String::new();
    let flush = |text: &mut String, pieces: &mut Vec<Piece>| {
        if !text.is_empty() {
            pieces.push(Piece::Text(std::mem::take(text)));
        }
    };

    let mut index = 0;
    while index < run.len() {
        let c = run[index];

        if rule.escape_character() == Some(c) {
            match run.get(index + 1) {
                Some(&next) if rule.is_tag_char(next) => {
                    flush(&mut text, &mut pieces);
                    pieces.push(Piece::Literal(next.to_string()));
                    index += 2;
                }
                _ => {
                    text.push(c);
                    index += 1;
                }
            }
            continue;
        }

        if !allowed {
            text.push(c);
            index += 1;
            continue;
        }

        match rule.kind() {
            TagKind::Repeating => {
                let len = run[index..].iter().take_while(|&&other| other == c).count();
                let glyphs: String = run[index..index + len].iter().collect();
                if len < rule.min_repeat() {
                    text.push_str(&glyphs);
                } else {
                    flush(&mut text, &mut pieces);
                    pieces.push(Piece::Repeating(glyphs));
                }
                index += len;
            }
            TagKind::Open => match rule.match_tag(&run[index..]) {
                Some((role, len)) => {
                    flush(&mut text, &mut pieces);
                    pieces.push(Piece::Tag(role, run[index..index + len].iter().collect()));
                    index += len;
                }
                None => {
                    text.push(c);
                    index += 1;
                }
            },
        }
    }

    flush(&mut text, &mut pieces);
    pieces
}

/// Scan `atoms` with a single rule.
///
/// Delimiters that cannot form a span come back as literal text; the
/// remaining delimiter tokens are left unresolved for the styling pass.
pub(crate) fn scan(atoms: &[Atom], rule: &CharacterRule) -> Vec<Token> {
    let mut machine = TagMachine::new(rule);
    let mut index = 0;

    while index < atoms.len() {
        let start = index;
        while index < atoms.len() && !atoms[index].is_interesting(rule) {
            index += 1;
        }
        machine.push_plain(&atoms[start..index]);
        if index == atoms.len() {
            break;
        }

        let start = index;
        let mut run = Vec::new();
        while let Some(Atom::Char(c)) = atoms.get(index).filter(|atom| atom.is_interesting(rule)) {
            run.push(*c);
            index += 1;
        }

        let before = start.checked_sub(1).map(|i| atoms[i].neighbour());
        let after = atoms.get(index).map(|atom| atom.neighbour());
        let allowed = rule.spacing().allows(before, after);
        machine.push_run(split_run(&run, rule, allowed));
    }

    machine.finish()
}

/// Convert plain text into scanner input
#[cfg(test)]
pub(crate) fn atoms(text: &str) -> Vec<Atom> {
    text.chars().map(Atom::Char).collect()
}
