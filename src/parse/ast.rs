use super::lexer::{Token, TokenKind};
use crate::common::*;
use std::ops::Range;

/// Behaviour shared by every syntax tree node.
#[enum_dispatch::enum_dispatch]
pub trait Expr {
    /// The token the node was built from.
    fn token(&self) -> &Token;

    /// Leaves, rolls and random numbers are primary; operator nodes are not.
    fn is_primary(&self) -> bool {
        true
    }

    /// Whether evaluating the node still has to draw dice.
    fn is_variable(&self) -> bool {
        false
    }

    fn precedence(&self) -> Precedence {
        Precedence::Primary
    }

    /// The node as an S-expression.
    fn sexp(&self) -> String;
}

#[derive(Debug, Clone, PartialEq)]
#[enum_dispatch::enum_dispatch(Expr)]
pub enum Node {
    Integer(Integer),
    Prefix(Prefix),
    Infix(Infix),
    RandomNumber(RandomNumber),
    SumRoll(SumRoll),
    ListRoll(ListRoll),
    RerollList(RerollList),
    ExplodeRoll(ExplodeRoll),
    Compare(Compare),
    ChoiceList(ChoiceList),
    SumRollResult(SumRollResult),
    DiceListResult(DiceListResult),
}

impl Node {
    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Self::Prefix(p) => vec![&*p.operand],
            Self::Infix(i) => vec![&*i.left, &*i.right],
            Self::RandomNumber(r) => vec![&*r.low, &*r.high],
            Self::SumRoll(r) => vec![&*r.count, &*r.sides],
            Self::ListRoll(l) => l.rolls.iter().flat_map(RollArgs::children).collect(),
            Self::RerollList(l) => list_children(&l.rolls, l.threshold.as_deref()),
            Self::ExplodeRoll(l) => list_children(&l.rolls, l.threshold.as_deref()),
            Self::Compare(c) => vec![&*c.left, &*c.right],
            Self::Integer(_)
            | Self::ChoiceList(_)
            | Self::SumRollResult(_)
            | Self::DiceListResult(_) => vec![],
        }
    }

    /// Whether `pred` holds for this node or any node below it.
    pub fn any(&self, pred: &impl Fn(&Node) -> bool) -> bool {
        pred(self) || self.children().into_iter().any(|child| child.any(pred))
    }

    /// Whether the node draws anything at all, dice or random numbers.
    pub fn is_random(&self) -> bool {
        self.any(&|node| node.is_variable() || matches!(node, Node::RandomNumber(_)))
    }
}

fn list_children<'a>(rolls: &'a [RollArgs], threshold: Option<&'a Node>) -> Vec<&'a Node> {
    rolls
        .iter()
        .flat_map(RollArgs::children)
        .chain(threshold)
        .collect()
}

fn list_precedence(rolls: &[RollArgs]) -> Precedence {
    if rolls.len() > 1 {
        Precedence::Additive
    } else {
        Precedence::Roll
    }
}

/// `threshold` is `None` for lists that never take one.
fn list_sexp(
    name: &str,
    roll: &str,
    rolls: &[RollArgs],
    threshold: Option<Option<&Node>>,
) -> String {
    let mut parts = vec![name.to_string()];
    if let Some(threshold) = threshold {
        parts.push(threshold.map_or_else(|| "nil".to_string(), Expr::sexp));
    }
    parts.extend(rolls.iter().map(|args| args.sexp(roll)));
    format!("({})", parts.join(" "))
}

fn dice_sexp(name: &str, dice: &[Die]) -> String {
    let mut parts = vec![name.to_string()];
    parts.extend(dice.iter().map(Die::to_string));
    format!("({})", parts.join(" "))
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Integer {
    pub token: Token,
    pub value: Int,
}

impl Integer {
    pub fn new(token: Token, value: Int) -> Self {
        Self { token, value }
    }

    /// An integer that replaces an evaluated node spanning `span`.
    pub fn synthetic(value: Int, span: Range<usize>) -> Self {
        Self::new(Token::new(TokenKind::Integer, value.to_string(), span), value)
    }
}

impl Expr for Integer {
    fn token(&self) -> &Token {
        &self.token
    }

    fn sexp(&self) -> String {
        self.value.to_string()
    }
}

/// Unary negation.
#[derive(Debug, Clone, PartialEq)]
pub struct Prefix {
    pub token: Token,
    pub operand: Box<Node>,
}

impl Expr for Prefix {
    fn token(&self) -> &Token {
        &self.token
    }

    fn is_primary(&self) -> bool {
        false
    }

    fn is_variable(&self) -> bool {
        self.operand.is_variable()
    }

    fn precedence(&self) -> Precedence {
        Precedence::Prefix
    }

    fn sexp(&self) -> String {
        format!("(- {})", self.operand.sexp())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Infix {
    pub token: Token,
    pub left: Box<Node>,
    pub op: ArithOp,
    pub right: Box<Node>,
}

impl Expr for Infix {
    fn token(&self) -> &Token {
        &self.token
    }

    fn is_primary(&self) -> bool {
        false
    }

    fn is_variable(&self) -> bool {
        self.left.is_variable() || self.right.is_variable()
    }

    fn precedence(&self) -> Precedence {
        self.op.precedence()
    }

    fn sexp(&self) -> String {
        format!(
            "({} {} {})",
            self.op.sexp_symbol(),
            self.left.sexp(),
            self.right.sexp()
        )
    }
}

/// `[low...high]`
#[derive(Debug, Clone, PartialEq)]
pub struct RandomNumber {
    pub token: Token,
    pub low: Box<Node>,
    pub high: Box<Node>,
}

impl Expr for RandomNumber {
    fn token(&self) -> &Token {
        &self.token
    }

    fn is_variable(&self) -> bool {
        self.low.is_variable() || self.high.is_variable()
    }

    fn sexp(&self) -> String {
        format!("(Rand {} {})", self.low.sexp(), self.high.sexp())
    }
}

/// Count and sides of one roll inside a list.
#[derive(Debug, Clone, PartialEq)]
pub struct RollArgs {
    pub token: Token,
    pub count: Box<Node>,
    pub sides: Box<Node>,
}

impl RollArgs {
    pub fn children(&self) -> [&Node; 2] {
        [&*self.count, &*self.sides]
    }

    fn sexp(&self, name: &str) -> String {
        format!("({} {} {})", name, self.count.sexp(), self.sides.sexp())
    }
}

/// `xDy`
#[derive(Debug, Clone, PartialEq)]
pub struct SumRoll {
    pub token: Token,
    pub count: Box<Node>,
    pub sides: Box<Node>,
}

impl Expr for SumRoll {
    fn token(&self) -> &Token {
        &self.token
    }

    fn is_variable(&self) -> bool {
        true
    }

    fn precedence(&self) -> Precedence {
        Precedence::Roll
    }

    fn sexp(&self) -> String {
        format!("(DRoll {} {})", self.count.sexp(), self.sides.sexp())
    }
}

/// `xBy` rolls joined by `+`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRoll {
    pub token: Token,
    pub rolls: NonEmpty<RollArgs>,
}

impl Expr for ListRoll {
    fn token(&self) -> &Token {
        &self.token
    }

    fn is_variable(&self) -> bool {
        true
    }

    fn precedence(&self) -> Precedence {
        list_precedence(&self.rolls)
    }

    fn sexp(&self) -> String {
        list_sexp("BRollList", "BRoll", &self.rolls, None)
    }
}

/// `xRy` rolls joined by `+`, with an optional shared `[threshold]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RerollList {
    pub token: Token,
    pub rolls: NonEmpty<RollArgs>,
    pub threshold: Option<Box<Node>>,
}

impl Expr for RerollList {
    fn token(&self) -> &Token {
        &self.token
    }

    fn is_variable(&self) -> bool {
        true
    }

    fn precedence(&self) -> Precedence {
        list_precedence(&self.rolls)
    }

    fn sexp(&self) -> String {
        list_sexp("RRollList", "RRoll", &self.rolls, Some(self.threshold.as_deref()))
    }
}

/// `xUy` rolls joined by `+`, with an optional shared `[threshold]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplodeRoll {
    pub token: Token,
    pub rolls: NonEmpty<RollArgs>,
    pub threshold: Option<Box<Node>>,
}

impl Expr for ExplodeRoll {
    fn token(&self) -> &Token {
        &self.token
    }

    fn is_variable(&self) -> bool {
        true
    }

    fn precedence(&self) -> Precedence {
        list_precedence(&self.rolls)
    }

    fn sexp(&self) -> String {
        list_sexp("URollList", "URoll", &self.rolls, Some(self.threshold.as_deref()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compare {
    pub token: Token,
    pub left: Box<Node>,
    pub op: CompareOp,
    pub right: Box<Node>,
}

impl Expr for Compare {
    fn token(&self) -> &Token {
        &self.token
    }

    fn is_primary(&self) -> bool {
        false
    }

    fn is_variable(&self) -> bool {
        self.left.is_variable() || self.right.is_variable()
    }

    fn precedence(&self) -> Precedence {
        Precedence::Comparison
    }

    fn sexp(&self) -> String {
        format!("({} {} {})", self.op, self.left.sexp(), self.right.sexp())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ChoiceList {
    pub token: Token,
    pub items: NonEmpty<String>,
}

impl Expr for ChoiceList {
    fn token(&self) -> &Token {
        &self.token
    }

    fn sexp(&self) -> String {
        let items: Vec<_> = self.items.iter().map(|item| format!("{:?}", item)).collect();
        format!("(Choice {})", items.join(" "))
    }
}

/// Dice rolled for a sum or explode roll.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SumRollResult {
    pub token: Token,
    pub dice: Vec<Die>,
}

impl SumRollResult {
    pub fn new(token: Token, dice: Vec<Die>) -> Self {
        Self { token, dice }
    }

    /// Sum of the dice, `None` on overflow.
    pub fn value(&self) -> Option<Int> {
        self.dice
            .iter()
            .try_fold(0 as Int, |acc, die| acc.checked_add(die.value))
    }
}

impl Expr for SumRollResult {
    fn token(&self) -> &Token {
        &self.token
    }

    fn sexp(&self) -> String {
        dice_sexp("SumRollResult", &self.dice)
    }
}

/// Kept dice of a B or R list.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DiceListResult {
    pub token: Token,
    pub dice: Vec<Die>,
}

impl DiceListResult {
    pub fn new(token: Token, dice: Vec<Die>) -> Self {
        Self { token, dice }
    }

    pub fn values(&self) -> Vec<Int> {
        self.dice.iter().map(|die| die.value).collect()
    }
}

impl Expr for DiceListResult {
    fn token(&self) -> &Token {
        &self.token
    }

    fn sexp(&self) -> String {
        dice_sexp("DiceListResult", &self.dice)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CommandKind {
    Calc,
    DRollExpr,
    DRollComp,
    BRollList,
    BRollComp,
    RRollList,
    RRollComp,
    URollExpr,
    URollComp,
    Choice,
}

impl CommandKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Calc => "Calc",
            Self::DRollExpr => "DRollExpr",
            Self::DRollComp => "DRollComp",
            Self::BRollList => "BRollList",
            Self::BRollComp => "BRollComp",
            Self::RRollList => "RRollList",
            Self::RRollComp => "RRollComp",
            Self::URollExpr => "URollExpr",
            Self::URollComp => "URollComp",
            Self::Choice => "Choice",
        }
    }

    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::DRollComp | Self::BRollComp | Self::RRollComp | Self::URollComp
        )
    }
}

/// Root of every parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub token: Token,
    pub kind: CommandKind,
    pub secret: bool,
    pub expr: Node,
}

impl Expr for Command {
    fn token(&self) -> &Token {
        &self.token
    }

    fn is_primary(&self) -> bool {
        false
    }

    fn is_variable(&self) -> bool {
        self.expr.is_variable()
    }

    fn precedence(&self) -> Precedence {
        Precedence::Lowest
    }

    fn sexp(&self) -> String {
        let inner = match &self.expr {
            Node::ChoiceList(choice) => choice.sexp(),
            expr => format!("({} {})", self.kind.name(), expr.sexp()),
        };
        if self.secret {
            format!("(Secret {})", inner)
        } else {
            inner
        }
    }
}
