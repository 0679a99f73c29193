//! Parser for command-engine scripts.
//!
//! A script is a sequence of statements separated by newlines or `;`. Each
//! statement is a command name followed by arguments:
//!
//! ```text
//! # comment
//! sleep $ms
//! echo "$i | Slept: $ms ms"; emit name=build status="ok"
//! ```

use scriptpool_api::ScriptError;

/// A piece of a double-quoted string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Variable(String),
}

/// One unevaluated argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare word; becomes a number, bool, null or text when evaluated.
    Word(String),
    /// Double-quoted string with `$name` interpolation.
    Quoted(Vec<Segment>),
    /// `$name`
    Variable(String),
    /// `key=value`
    Pair(String, Box<Token>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub command: String,
    pub args: Vec<Token>,
    /// 1-based line the statement starts on.
    pub line: usize,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_word_end(c: char) -> bool {
    c.is_whitespace() || c == ';' || c == '"'
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self { chars: text.chars().peekable(), line: 1 }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn skip_comment(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if !is_name_char(c) {
                break;
            }
            name.push(c);
            self.bump();
        }
        name
    }

    fn read_quoted(&mut self) -> Result<Token, ScriptError> {
        let start_line = self.line;
        self.bump(); // opening quote
        let mut segments = Vec::new();
        let mut literal = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(ScriptError::invalid(format!(
                        "unterminated string starting on line {start_line}"
                    )))
                }
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('n') => literal.push('\n'),
                    Some('t') => literal.push('\t'),
                    Some(c) => literal.push(c),
                    None => {
                        return Err(ScriptError::invalid(format!(
                            "unterminated string starting on line {start_line}"
                        )))
                    }
                },
                Some('$') => {
                    let name = self.read_name();
                    if name.is_empty() {
                        literal.push('$');
                    } else {
                        if !literal.is_empty() {
                            segments.push(Segment::Literal(std::mem::take(&mut literal)));
                        }
                        segments.push(Segment::Variable(name));
                    }
                }
                Some(c) => literal.push(c),
            }
        }
        if !literal.is_empty() || segments.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Token::Quoted(segments))
    }

    /// Variable, quoted string or bare word, whichever starts here.
    fn read_value(&mut self) -> Result<Token, ScriptError> {
        match self.chars.peek() {
            Some('"') => self.read_quoted(),
            Some('$') => {
                self.bump();
                let name = self.read_name();
                if name.is_empty() {
                    return Err(ScriptError::invalid(format!("empty variable name on line {}", self.line)));
                }
                Ok(Token::Variable(name))
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = self.chars.peek() {
                    if is_word_end(c) {
                        break;
                    }
                    word.push(c);
                    self.bump();
                }
                Ok(Token::Word(word))
            }
        }
    }

    fn read_token(&mut self) -> Result<Token, ScriptError> {
        if matches!(self.chars.peek(), Some('"') | Some('$')) {
            return self.read_value();
        }
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if is_word_end(c) {
                break;
            }
            if c == '=' && !word.is_empty() && word.chars().all(is_name_char) {
                self.bump();
                let value = match self.chars.peek() {
                    Some(&c) if c.is_whitespace() || c == ';' => Token::Word(String::new()),
                    None => Token::Word(String::new()),
                    _ => self.read_value()?,
                };
                return Ok(Token::Pair(word, Box::new(value)));
            }
            word.push(c);
            self.bump();
        }
        Ok(Token::Word(word))
    }

    fn parse(mut self) -> Result<Vec<Statement>, ScriptError> {
        let mut statements = Vec::new();
        let mut current: Vec<Token> = Vec::new();
        let mut start_line = self.line;

        loop {
            let next = self.chars.peek().copied();
            match next {
                None | Some('\n') | Some(';') => {
                    if !current.is_empty() {
                        statements.push(finish_statement(std::mem::take(&mut current), start_line)?);
                    }
                    if next.is_none() {
                        break;
                    }
                    self.bump();
                    start_line = self.line;
                }
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') if current.is_empty() => self.skip_comment(),
                Some(_) => {
                    if current.is_empty() {
                        start_line = self.line;
                    }
                    current.push(self.read_token()?);
                }
            }
        }
        Ok(statements)
    }
}

fn finish_statement(mut tokens: Vec<Token>, line: usize) -> Result<Statement, ScriptError> {
    let args = tokens.split_off(1);
    match tokens.pop() {
        Some(Token::Word(command)) if !command.is_empty() => Ok(Statement {
            command: command.to_ascii_lowercase(),
            args,
            line,
        }),
        _ => Err(ScriptError::invalid(format!(
            "statement on line {line} must start with a command name"
        ))),
    }
}

/// Parse script text into statements. Blank text parses to no statements.
pub fn parse(text: &str) -> Result<Vec<Statement>, ScriptError> {
    Parser::new(text).parse()
}
