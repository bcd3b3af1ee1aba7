//! Rule framework: the contract every validation rule implements.

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::ast::Node;
use crate::ast::visit::Visit;

use super::context::ValidationContext;

/// Callbacks a rule runs while the document is walked.
///
/// Type information in the context is already updated for `node` when
/// `enter` runs, and still describes `node` when `leave` runs.
pub trait Visitor<'a> {
    fn enter(&mut self, _ctx: &mut ValidationContext<'a>, _node: Node<'a>) {}

    fn leave(&mut self, _ctx: &mut ValidationContext<'a>, _node: Node<'a>) {}
}

/// A boxed rule visitor.
pub type BoxedVisitor<'a> = Box<dyn Visitor<'a> + 'a>;

/// Whether a rule's outcome depends on the request or only on the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleScope {
    /// Fixed by the document and schema; need not re-run for a document that
    /// was already validated.
    Document,
    /// Depends on request variable values.
    Request,
}

/// A validation rule.
///
/// Rules are stateless; per-run state lives in the visitor they create.
pub trait ValidationRule: Send + Sync {
    /// Rule name, e.g. `NoFragmentCycles`.
    fn name(&self) -> &'static str;

    /// Error code reported by the rule, e.g. `NO_FRAGMENT_CYCLES`.
    fn code(&self) -> &'static str;

    fn scope(&self) -> RuleScope {
        RuleScope::Document
    }

    /// Creates the visitor for one run, or `None` to opt out.
    fn create_visitor<'a>(&self, ctx: &ValidationContext<'a>) -> Option<BoxedVisitor<'a>>;

    /// Asynchronous variant of [`ValidationRule::create_visitor`]; the only
    /// point where validation may suspend. Wraps the synchronous constructor
    /// by default.
    fn create_visitor_async<'r, 'a: 'r>(
        &'r self,
        ctx: &'r ValidationContext<'a>,
    ) -> LocalBoxFuture<'r, Option<BoxedVisitor<'a>>> {
        future::ready(self.create_visitor(ctx)).boxed_local()
    }
}

/// Runs type tracking and every active visitor in one walk.
pub(crate) struct CompositeVisitor<'a> {
    pub ctx: ValidationContext<'a>,
    pub visitors: Vec<BoxedVisitor<'a>>,
}

impl<'a> Visit<'a> for CompositeVisitor<'a> {
    fn enter(&mut self, node: Node<'a>) {
        self.ctx.type_info.enter(node);
        for visitor in &mut self.visitors {
            visitor.enter(&mut self.ctx, node);
        }
    }

    fn leave(&mut self, node: Node<'a>) {
        for visitor in &mut self.visitors {
            visitor.leave(&mut self.ctx, node);
        }
        self.ctx.type_info.leave(node);
    }
}
