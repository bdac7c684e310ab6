use super::ast::*;
use super::error::{ParseError, ParseErrorKind};
use super::lexer::{tokenize, Token, TokenKind};
use crate::common::*;

type PResult<T = Node> = Result<T, ParseError>;

/// Precedence-climbing parser over a fully tokenized command.
pub struct Parser<'a> {
    source_name: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source_name: &'a str, input: &str) -> PResult<Self> {
        let tokens = tokenize(input).map_err(|err| {
            let position = err.position();
            let slice: String = input
                .get(position..)
                .and_then(|rest| rest.chars().next())
                .map(String::from)
                .unwrap_or_default();
            ParseError {
                source_name: source_name.to_string(),
                span: position..position + slice.len(),
                slice,
                kind: ParseErrorKind::Lex(err),
            }
        })?;

        Ok(Self {
            source_name,
            tokens,
            pos: 0,
        })
    }

    pub fn parse(mut self) -> PResult<Command> {
        let token = self.peek().clone();
        let secret = self.matches(TokenKind::Secret) && self.peek_nth_kind(1) != TokenKind::Eof;
        if secret {
            self.advance();
        }

        let (kind, expr) = match self.peek_kind() {
            TokenKind::Calc => self.parse_calc()?,
            TokenKind::Choice => self.parse_choice()?,
            _ => self.parse_roll_command()?,
        };
        self.consume(TokenKind::Eof)?;

        Ok(Command {
            token,
            kind,
            secret,
            expr,
        })
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_nth_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn matches(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn matches_any(&self, options: &[TokenKind]) -> bool {
        options.contains(&self.peek_kind())
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<Token> {
        if self.matches(expected) {
            Ok(self.advance())
        } else {
            self.unexpected_token(vec![expected])
        }
    }

    fn error<T>(&self, kind: ParseErrorKind) -> PResult<T> {
        self.error_at(self.peek(), kind)
    }

    fn error_at<T>(&self, token: &Token, kind: ParseErrorKind) -> PResult<T> {
        Err(ParseError {
            source_name: self.source_name.to_string(),
            kind,
            span: token.span.clone(),
            slice: token.literal.clone(),
        })
    }

    fn unexpected_token<T>(&self, expected: Vec<TokenKind>) -> PResult<T> {
        let found = self.peek_kind();
        self.error(ParseErrorKind::UnexpectedToken { found, expected })
    }

    fn parse_calc(&mut self) -> PResult<(CommandKind, Node)> {
        self.consume(TokenKind::Calc)?;
        self.consume(TokenKind::LeftParen)?;
        let expr = self.parse_expression(Precedence::Additive)?;
        self.consume(TokenKind::RightParen)?;

        if expr.is_random() {
            return self.error_at(expr.token(), ParseErrorKind::RandomInCalc);
        }
        Ok((CommandKind::Calc, expr))
    }

    fn parse_choice(&mut self) -> PResult<(CommandKind, Node)> {
        let token = self.consume(TokenKind::Choice)?;
        let body = token
            .literal
            .split_once('[')
            .and_then(|(_, rest)| rest.split_once(']'))
            .map_or("", |(body, _)| body);

        let mut items: Vec<String> = body.split(',').map(|s| s.trim().to_string()).collect();
        while items.last().map_or(false, String::is_empty) {
            items.pop();
        }

        match NonEmpty::try_from_vec(items) {
            Ok(items) => Ok((CommandKind::Choice, ChoiceList { token, items }.into())),
            Err(_) => self.error_at(&token, ParseErrorKind::EmptyChoice),
        }
    }

    fn parse_roll_command(&mut self) -> PResult<(CommandKind, Node)> {
        let expr = self.parse_expression(Precedence::Lowest)?;

        if let Some(list) = misplaced_list(&expr, true) {
            return self.error_at(list.token(), ParseErrorKind::MisplacedListRoll);
        }
        if !expr.is_random() {
            return self.error_at(expr.token(), ParseErrorKind::NotRandom);
        }

        let explodes = |node: &Node| node.any(&|n| matches!(n, Node::ExplodeRoll(_)));
        let kind = match &expr {
            Node::ListRoll(_) => CommandKind::BRollList,
            Node::RerollList(_) => CommandKind::RRollList,
            Node::Compare(cmp) => match &*cmp.left {
                Node::ListRoll(_) => CommandKind::BRollComp,
                Node::RerollList(_) => CommandKind::RRollComp,
                left if explodes(left) => CommandKind::URollComp,
                _ => CommandKind::DRollComp,
            },
            expr if explodes(expr) => CommandKind::URollExpr,
            _ => CommandKind::DRollExpr,
        };
        Ok((kind, expr))
    }

    fn infix_precedence(&self) -> Option<Precedence> {
        Some(match self.peek_kind() {
            TokenKind::Plus | TokenKind::Minus => Precedence::Additive,
            TokenKind::Star | TokenKind::Slash => Precedence::Multiplicative,
            TokenKind::D | TokenKind::B => Precedence::Roll,
            // a trailing U or R is a rounding suffix, not a roll
            TokenKind::R | TokenKind::U
                if TokenKind::OPERAND_START.contains(&self.peek_nth_kind(1)) =>
            {
                Precedence::Roll
            }
            _ if self.matches_any(TokenKind::COMPARISON_OPS) => Precedence::Comparison,
            _ => return None,
        })
    }

    fn parse_expression(&mut self, floor: Precedence) -> PResult {
        let mut left = self.parse_prefix()?;

        while let Some(prec) = self.infix_precedence() {
            if prec < floor {
                break;
            }
            left = match prec {
                Precedence::Roll => self.parse_roll(left)?,
                Precedence::Comparison => self.parse_comparison(left)?,
                _ => self.parse_arithmetic(left)?,
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> PResult {
        match self.peek_kind() {
            TokenKind::Minus => {
                let token = self.advance();
                let operand = self.parse_expression(Precedence::Roll)?;
                Ok(Prefix {
                    token,
                    operand: Box::new(operand),
                }
                .into())
            }
            TokenKind::Plus => {
                self.advance();
                self.parse_expression(Precedence::Roll)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> PResult {
        match self.peek_kind() {
            TokenKind::Integer => self.parse_integer(),
            TokenKind::LeftParen => self.parse_group(),
            TokenKind::LeftBracket => self.parse_random_number(),
            _ => self.unexpected_token(vec![
                TokenKind::Integer,
                TokenKind::LeftParen,
                TokenKind::LeftBracket,
                TokenKind::Minus,
            ]),
        }
    }

    fn parse_roll_operand(&mut self) -> PResult {
        match self.peek_kind() {
            TokenKind::Integer => self.parse_integer(),
            TokenKind::LeftParen => self.parse_group(),
            TokenKind::LeftBracket => self.parse_random_number(),
            _ => self.unexpected_token(TokenKind::OPERAND_START.to_vec()),
        }
    }

    fn parse_integer(&mut self) -> PResult {
        let token = self.consume(TokenKind::Integer)?;
        match token.literal.parse::<Int>() {
            Ok(value) => Ok(Integer::new(token, value).into()),
            Err(_) => self.error_at(&token, ParseErrorKind::IntegerOverflow),
        }
    }

    fn parse_group(&mut self) -> PResult {
        self.consume(TokenKind::LeftParen)?;
        let inner = self.parse_expression(Precedence::Additive)?;
        self.consume(TokenKind::RightParen)?;
        Ok(inner)
    }

    fn parse_random_number(&mut self) -> PResult {
        let token = self.consume(TokenKind::LeftBracket)?;
        let low = self.parse_expression(Precedence::Additive)?;
        self.consume(TokenKind::Ellipsis)?;
        let high = self.parse_expression(Precedence::Additive)?;
        self.consume(TokenKind::RightBracket)?;

        Ok(RandomNumber {
            token,
            low: Box::new(low),
            high: Box::new(high),
        }
        .into())
    }

    fn parse_arithmetic(&mut self, left: Node) -> PResult {
        let token = self.advance();
        let op = match token.kind {
            TokenKind::Plus => ArithOp::Add,
            TokenKind::Minus => ArithOp::Sub,
            TokenKind::Star => ArithOp::Mul,
            _ => ArithOp::Div(Rounding::Truncate),
        };
        let right = self.parse_expression(op.precedence().next())?;

        let op = match (op, self.peek_kind()) {
            (ArithOp::Div(_), TokenKind::U) => {
                self.advance();
                ArithOp::Div(Rounding::Up)
            }
            (ArithOp::Div(_), TokenKind::R) => {
                self.advance();
                ArithOp::Div(Rounding::Nearest)
            }
            (op, _) => op,
        };

        if op == ArithOp::Add {
            match join_lists(left, right) {
                Ok(list) => Ok(list),
                Err((left, right)) => Ok(infix(token, left, op, right)),
            }
        } else {
            Ok(infix(token, left, op, right))
        }
    }

    fn parse_comparison(&mut self, left: Node) -> PResult {
        if let Node::Compare(_) = left {
            return self.error(ParseErrorKind::ChainedComparison);
        }

        let token = self.advance();
        let op = match token.kind {
            TokenKind::Equal => CompareOp::Eq,
            TokenKind::NotEqual => CompareOp::Ne,
            TokenKind::LessThan => CompareOp::Lt,
            TokenKind::GreaterThan => CompareOp::Gt,
            TokenKind::LessEqual => CompareOp::Le,
            _ => CompareOp::Ge,
        };
        let right = self.parse_expression(Precedence::Additive)?;

        Ok(Compare {
            token,
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
        .into())
    }

    fn parse_roll(&mut self, left: Node) -> PResult {
        let token = self.advance();
        let count = Box::new(left);
        let sides = Box::new(self.parse_roll_operand()?);

        Ok(match token.kind {
            TokenKind::D => SumRoll {
                token,
                count,
                sides,
            }
            .into(),
            TokenKind::B => ListRoll {
                rolls: vec1![RollArgs {
                    token: token.clone(),
                    count,
                    sides
                }],
                token,
            }
            .into(),
            TokenKind::R => RerollList {
                rolls: vec1![RollArgs {
                    token: token.clone(),
                    count,
                    sides
                }],
                threshold: self.parse_threshold()?,
                token,
            }
            .into(),
            _ => ExplodeRoll {
                rolls: vec1![RollArgs {
                    token: token.clone(),
                    count,
                    sides
                }],
                threshold: self.parse_threshold()?,
                token,
            }
            .into(),
        })
    }

    fn parse_threshold(&mut self) -> PResult<Option<Box<Node>>> {
        if !self.matches(TokenKind::LeftBracket) {
            return Ok(None);
        }
        self.advance();
        let threshold = self.parse_expression(Precedence::Additive)?;
        self.consume(TokenKind::RightBracket)?;
        Ok(Some(Box::new(threshold)))
    }
}

fn infix(token: Token, left: Node, op: ArithOp, right: Node) -> Node {
    Infix {
        token,
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
    .into()
}

/// Merges `a + b` when both sides are lists of the same kind and `a` has no threshold yet.
fn join_lists(left: Node, right: Node) -> Result<Node, (Node, Node)> {
    match (left, right) {
        (Node::ListRoll(mut l), Node::ListRoll(r)) => {
            l.rolls.extend(r.rolls);
            Ok(l.into())
        }
        (Node::RerollList(mut l), Node::RerollList(r)) if l.threshold.is_none() => {
            l.rolls.extend(r.rolls);
            l.threshold = r.threshold;
            Ok(l.into())
        }
        (Node::ExplodeRoll(mut l), Node::ExplodeRoll(r)) if l.threshold.is_none() => {
            l.rolls.extend(r.rolls);
            l.threshold = r.threshold;
            Ok(l.into())
        }
        (left, right) => Err((left, right)),
    }
}

/// Finds a B or R list anywhere other than the root or the left side of a root comparison.
fn misplaced_list(node: &Node, top: bool) -> Option<&Node> {
    if !top && matches!(node, Node::ListRoll(_) | Node::RerollList(_)) {
        return Some(node);
    }
    match node {
        Node::Compare(cmp) if top => {
            misplaced_list(&cmp.left, true).or_else(|| misplaced_list(&cmp.right, false))
        }
        _ => node
            .children()
            .into_iter()
            .find_map(|child| misplaced_list(child, false)),
    }
}

#[cfg(test)]
mod tests {
    use super::super::error::LexError;
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(s: &str) -> PResult<Command> {
        Parser::new("test", s)?.parse()
    }

    fn check(s: &str, expected: &str) {
        let parsed = parse(s).unwrap();
        assert_eq!(parsed.sexp(), expected, "input: {:?}", s);
    }

    fn check_err(s: &str, expected: ParseErrorKind) {
        let err = parse(s).unwrap_err();
        assert_eq!(err.kind, expected, "input: {:?}", s);
    }

    #[test]
    fn test_parse_sum_roll() {
        check("2d6", "(DRollExpr (DRoll 2 6))");
        check(
            "2d6+1-1-2-3-4",
            "(DRollExpr (- (- (- (- (+ (DRoll 2 6) 1) 1) 2) 3) 4))",
        );
        check(
            "(2*3-4)d6-1d4+1",
            "(DRollExpr (+ (- (DRoll (- (* 2 3) 4) 6) (DRoll 1 4)) 1))",
        );
        check("2D(1+5)", "(DRollExpr (DRoll 2 (+ 1 5)))");
        check("[1...3]d6", "(DRollExpr (DRoll (Rand 1 3) 6))");
    }

    #[test]
    fn test_parse_prefix() {
        check("-2d6", "(DRollExpr (- (DRoll 2 6)))");
        check("-(2D6)", "(DRollExpr (- (DRoll 2 6)))");
        check("+2D6+1", "(DRollExpr (+ (DRoll 2 6) 1))");
        check("-2*3d6", "(DRollExpr (* (- 2) (DRoll 3 6)))");
        check("--1d6", "(DRollExpr (- (- (DRoll 1 6))))");
    }

    #[test]
    fn test_parse_division_rounding() {
        check("2d6/2", "(DRollExpr (/ (DRoll 2 6) 2))");
        check("2d6/2u", "(DRollExpr (/U (DRoll 2 6) 2))");
        check("2d6/2R", "(DRollExpr (/R (DRoll 2 6) 2))");
        check("100/2d6r+1", "(DRollExpr (+ (/R 100 (DRoll 2 6)) 1))");
        check("C(100/(1+2)u)", "(Calc (/U 100 (+ 1 2)))");
    }

    #[test]
    fn test_parse_comparison() {
        check("2d6>=7", "(DRollComp (>= (DRoll 2 6) 7))");
        check("-2D6<-7", "(DRollComp (< (- (DRoll 2 6)) (- 7)))");
        check("2D6<>7", "(DRollComp (<> (DRoll 2 6) 7))");
        check("1+2D6=7", "(DRollComp (= (+ 1 (DRoll 2 6)) 7))");
    }

    #[test]
    fn test_parse_lists() {
        check("2b6", "(BRollList (BRollList (BRoll 2 6)))");
        check(
            "2b6+4b10>4",
            "(BRollComp (> (BRollList (BRoll 2 6) (BRoll 4 10)) 4))",
        );
        check("2r6[5]", "(RRollList (RRollList 5 (RRoll 2 6)))");
        check(
            "3r6+2r6[2]",
            "(RRollList (RRollList 2 (RRoll 3 6) (RRoll 2 6)))",
        );
        check("3r6>=4", "(RRollComp (>= (RRollList nil (RRoll 3 6)) 4))");
    }

    #[test]
    fn test_parse_explode() {
        check("3u6", "(URollExpr (URollList nil (URoll 3 6)))");
        check(
            "3u6+5u6[6]>=7",
            "(URollComp (>= (URollList 6 (URoll 3 6) (URoll 5 6)) 7))",
        );
        check(
            "3u6[6]+1",
            "(URollExpr (+ (URollList 6 (URoll 3 6)) 1))",
        );
        check(
            "(5+6)u10[10]+5>=8",
            "(URollComp (>= (+ (URollList 10 (URoll (+ 5 6) 10)) 5) 8))",
        );
    }

    #[test]
    fn test_parse_nested_roll() {
        check("(2d6)d6", "(DRollExpr (DRoll (DRoll 2 6) 6))");
        check("2d6d6", "(DRollExpr (DRoll (DRoll 2 6) 6))");
        check("2d(1d6)", "(DRollExpr (DRoll 2 (DRoll 1 6)))");
    }

    #[test]
    fn test_parse_calc_and_choice() {
        check("C(1+2*3)", "(Calc (+ 1 (* 2 3)))");
        check("c(-1)", "(Calc (- 1))");
        check("choice[A,B, ]", r#"(Choice "A" "B")"#);
        check("Choice[ A, B,   C     ,D ]", r#"(Choice "A" "B" "C" "D")"#);
        check("choice[A,B,C]どれにしよう", r#"(Choice "A" "B" "C")"#);
        check("CHOICE[日本語, でも,　だいじょうぶ]", r#"(Choice "日本語" "でも" "だいじょうぶ")"#);
    }

    #[test]
    fn test_parse_secret() {
        check("S2d6", "(Secret (DRollExpr (DRoll 2 6)))");
        check("sC(1)", "(Secret (Calc 1))");
        check("Schoice[A,B]", r#"(Secret (Choice "A" "B"))"#);
    }

    #[test]
    fn test_parse_errors() {
        check_err("2d6<2<3", ParseErrorKind::ChainedComparison);
        check_err("C(2d6)", ParseErrorKind::RandomInCalc);
        check_err("1+2", ParseErrorKind::NotRandom);
        check_err("1+2b6", ParseErrorKind::MisplacedListRoll);
        check_err("3r6[4]+2r6", ParseErrorKind::MisplacedListRoll);
        check_err("99999999999d6", ParseErrorKind::IntegerOverflow);
        check_err("choice[ , ]", ParseErrorKind::EmptyChoice);
        check_err(
            "2d",
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::Eof,
                expected: TokenKind::OPERAND_START.to_vec(),
            },
        );
        check_err(
            "2d6u",
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::U,
                expected: vec![TokenKind::Eof],
            },
        );
        check_err(
            "(2d6>=7)",
            ParseErrorKind::UnexpectedToken {
                found: TokenKind::GreaterEqual,
                expected: vec![TokenKind::RightParen],
            },
        );
        check_err(
            "2d6 & 1",
            ParseErrorKind::Lex(LexError::UnexpectedCharacter {
                position: 4,
                found: '&',
            }),
        );
    }

    #[test]
    fn test_error_position() {
        let err = parse("2d6<2<3").unwrap_err();
        assert_eq!(err.source_name, "test");
        assert_eq!(err.span, 5..6);
        assert_eq!(err.slice, "<");
    }
}
