//! Single-pass tree walker.

use crate::ast::{Ast, Node};
use crate::check::RegisteredCheck;
use crate::collector::{Reporter, ViolationCollector};
use crate::dispatch::DispatchTable;
use crate::messages::{Messages, GENERAL_CHECK_FAILURE};
use crate::text::FileText;
use crate::types::{Severity, Violation};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

/// Per-file inputs of a walk.
#[derive(Debug, Clone, Copy)]
pub struct WalkContext<'a> {
    /// The file being checked.
    pub file: &'a FileText,
    /// Message bundles for the run.
    pub messages: &'a Messages,
    /// Tab width used for column expansion.
    pub tab_width: usize,
}

#[derive(Clone, Copy)]
enum Phase<'t> {
    Begin(Option<Node<'t>>),
    Enter(Node<'t>),
    Leave(Node<'t>),
    Finish(Option<Node<'t>>),
}

impl<'t> Phase<'t> {
    fn node(self) -> Option<Node<'t>> {
        match self {
            Self::Begin(node) | Self::Finish(node) => node,
            Self::Enter(node) | Self::Leave(node) => Some(node),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Begin(_) => "begin_tree",
            Self::Enter(_) => "visit_token",
            Self::Leave(_) => "leave_token",
            Self::Finish(_) => "finish_tree",
        }
    }
}

/// Drives one worker's check instances over trees, one file at a time.
///
/// A check that fails (returns an error or panics) is reported through a
/// `general.check.failure` violation and muted until the next file.
pub struct TreeWalker {
    checks: Vec<RegisteredCheck>,
    table: Arc<DispatchTable>,
    muted: Vec<bool>,
    collector: ViolationCollector,
}

impl std::fmt::Debug for TreeWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeWalker")
            .field("checks", &self.checks)
            .field("muted", &self.muted)
            .finish_non_exhaustive()
    }
}

impl TreeWalker {
    /// Creates a walker over `checks`, dispatched through `table`.
    #[must_use]
    pub fn new(checks: Vec<RegisteredCheck>, table: Arc<DispatchTable>) -> Self {
        let muted = vec![false; checks.len()];
        Self {
            checks,
            table,
            muted,
            collector: ViolationCollector::new(),
        }
    }

    /// The checks driven by this walker, in configuration order.
    #[must_use]
    pub fn checks(&self) -> &[RegisteredCheck] {
        &self.checks
    }

    /// Walks `ast` once and returns the file's violations, sorted.
    pub fn walk(&mut self, ast: &Ast, ctx: &WalkContext<'_>) -> Vec<Violation> {
        self.collector.reset();
        self.muted.fill(false);

        let root = ast.root();
        for index in 0..self.checks.len() {
            self.invoke(index, Phase::Begin(root), ctx);
        }
        if let Some(root) = root {
            let table = Arc::clone(&self.table);
            self.traverse(root, &table, ctx);
        }
        for index in 0..self.checks.len() {
            self.invoke(index, Phase::Finish(root), ctx);
        }

        self.collector.take_sorted()
    }

    /// Pre-order walk without recursion: descend through first children,
    /// and when a subtree is exhausted climb parent links, leaving each node
    /// on the way, until a next sibling turns up.
    fn traverse(&mut self, root: Node<'_>, table: &DispatchTable, ctx: &WalkContext<'_>) {
        let mut current = Some(root);
        while let Some(node) = current {
            self.notify(table, Phase::Enter(node), ctx);

            let mut next = node.first_child();
            let mut climb = node;
            while next.is_none() {
                self.notify(table, Phase::Leave(climb), ctx);
                if climb.id() == root.id() {
                    break;
                }
                next = climb.next_sibling();
                if next.is_none() {
                    match climb.parent() {
                        Some(parent) => climb = parent,
                        None => break,
                    }
                }
            }
            current = next;
        }
    }

    fn notify(&mut self, table: &DispatchTable, phase: Phase<'_>, ctx: &WalkContext<'_>) {
        let Some(node) = phase.node() else {
            return;
        };
        for &index in table.interested(node.token_type()) {
            self.invoke(index, phase, ctx);
        }
    }

    fn invoke(&mut self, index: usize, phase: Phase<'_>, ctx: &WalkContext<'_>) {
        if self.muted[index] {
            return;
        }
        let registered = &mut self.checks[index];
        let outcome = {
            let check = &mut registered.check;
            let mut reporter = Reporter::new(
                &mut self.collector,
                &registered.meta,
                ctx.file,
                ctx.messages,
                ctx.tab_width,
            );
            catch_unwind(AssertUnwindSafe(|| match phase {
                Phase::Begin(root) => check.begin_tree(root, &mut reporter),
                Phase::Enter(node) => check.visit_token(node, &mut reporter),
                Phase::Leave(node) => check.leave_token(node, &mut reporter),
                Phase::Finish(root) => check.finish_tree(root, &mut reporter),
            }))
        };

        let failure = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err.message,
            Err(payload) => panic_message(payload.as_ref()),
        };

        let meta = &registered.meta;
        let name = meta.display_name().to_string();
        let path = ctx.file.path().display().to_string();
        warn!(
            check = %name,
            file = %path,
            callback = phase.label(),
            error = %failure,
            "check failed; muted for the rest of the file"
        );

        let args = vec![name, path, failure];
        let message = ctx.messages.render(GENERAL_CHECK_FAILURE, &args);
        let line = phase.node().map_or(0, Node::line);
        self.collector.push(
            Violation::new(line, 0, Severity::Error, GENERAL_CHECK_FAILURE, message, &meta.module)
                .with_module_id(meta.id.clone())
                .with_args(args),
        );
        self.muted[index] = true;
    }
}

impl Drop for TreeWalker {
    fn drop(&mut self) {
        for registered in &mut self.checks {
            let check = &mut registered.check;
            if catch_unwind(AssertUnwindSafe(|| check.destroy())).is_err() {
                warn!(check = %registered.meta.display_name(), "destroy panicked");
            }
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{Check, CheckError, CheckMeta, CheckResult};
    use crate::token::TokenType;
    use parking_lot::Mutex;

    const ROOT: TokenType = TokenType::new(0);
    const A: TokenType = TokenType::new(1);
    const B: TokenType = TokenType::new(2);

    type Trace = Arc<Mutex<Vec<String>>>;

    struct Tracer {
        name: &'static str,
        tokens: Vec<TokenType>,
        trace: Trace,
        fail_on: Option<&'static str>,
    }

    impl Tracer {
        fn record(&self, event: String) -> CheckResult {
            let fail = self.fail_on.is_some_and(|text| event.ends_with(text));
            self.trace.lock().push(format!("{}:{event}", self.name));
            if fail {
                Err(CheckError::new("boom"))
            } else {
                Ok(())
            }
        }
    }

    impl Check for Tracer {
        fn default_tokens(&self) -> Vec<TokenType> {
            self.tokens.clone()
        }
        fn begin_tree(&mut self, _root: Option<Node<'_>>, _r: &mut Reporter<'_>) -> CheckResult {
            self.record("begin".to_string())
        }
        fn visit_token(&mut self, node: Node<'_>, _r: &mut Reporter<'_>) -> CheckResult {
            self.record(format!("enter {}", node.text()))
        }
        fn leave_token(&mut self, node: Node<'_>, _r: &mut Reporter<'_>) -> CheckResult {
            self.record(format!("leave {}", node.text()))
        }
        fn finish_tree(&mut self, _root: Option<Node<'_>>, _r: &mut Reporter<'_>) -> CheckResult {
            self.record("finish".to_string())
        }
    }

    fn tracer(name: &'static str, tokens: &[TokenType], trace: &Trace) -> RegisteredCheck {
        RegisteredCheck {
            meta: CheckMeta::new(name),
            check: Box::new(Tracer {
                name,
                tokens: tokens.to_vec(),
                trace: Arc::clone(trace),
                fail_on: None,
            }),
        }
    }

    fn table(checks: &[RegisteredCheck]) -> Arc<DispatchTable> {
        let mut by_token = vec![Vec::new(); 3];
        for (index, check) in checks.iter().enumerate() {
            for ty in check.check.default_tokens() {
                by_token[ty.index()].push(index);
            }
        }
        Arc::new(DispatchTable::from_slots(by_token))
    }

    /// root
    /// ├── a1
    /// │   └── b1
    /// └── a2
    fn sample() -> Ast {
        let mut ast = Ast::with_root(ROOT, "root", 1, 0);
        let root = ast.root_id().unwrap();
        let a1 = ast.append_new(root, A, "a1", 1, 0);
        ast.append_new(a1, B, "b1", 2, 0);
        ast.append_new(root, A, "a2", 3, 0);
        ast
    }

    fn walk(walker: &mut TreeWalker, ast: &Ast) -> Vec<Violation> {
        let file = FileText::new("sample.t", "x\ny\nz\n");
        let messages = Messages::default();
        let ctx = WalkContext {
            file: &file,
            messages: &messages,
            tab_width: 8,
        };
        walker.walk(ast, &ctx)
    }

    #[test]
    fn enter_and_leave_in_preorder() {
        let trace = Trace::default();
        let checks = vec![tracer("t", &[ROOT, A, B], &trace)];
        let table = table(&checks);
        let mut walker = TreeWalker::new(checks, table);
        assert!(walk(&mut walker, &sample()).is_empty());

        assert_eq!(
            *trace.lock(),
            vec![
                "t:begin",
                "t:enter root",
                "t:enter a1",
                "t:enter b1",
                "t:leave b1",
                "t:leave a1",
                "t:enter a2",
                "t:leave a2",
                "t:leave root",
                "t:finish",
            ]
        );
    }

    #[test]
    fn only_interested_checks_are_called_in_registration_order() {
        let trace = Trace::default();
        let checks = vec![tracer("x", &[A], &trace), tracer("y", &[A, B], &trace)];
        let table = table(&checks);
        let mut walker = TreeWalker::new(checks, table);
        walk(&mut walker, &sample());

        let events: Vec<String> = trace
            .lock()
            .iter()
            .filter(|e| e.contains("enter"))
            .cloned()
            .collect();
        assert_eq!(
            events,
            vec!["x:enter a1", "y:enter a1", "y:enter b1", "x:enter a2", "y:enter a2"]
        );
    }

    #[test]
    fn empty_tree_still_begins_and_finishes() {
        let trace = Trace::default();
        let checks = vec![tracer("t", &[A], &trace)];
        let table = table(&checks);
        let mut walker = TreeWalker::new(checks, table);
        walk(&mut walker, &Ast::new());
        assert_eq!(*trace.lock(), vec!["t:begin", "t:finish"]);
    }

    #[test]
    fn failing_check_is_muted_for_the_file_only() {
        let trace = Trace::default();
        let mut failing = tracer("bad", &[A], &trace);
        failing.check = Box::new(Tracer {
            name: "bad",
            tokens: vec![A],
            trace: Arc::clone(&trace),
            fail_on: Some("a1"),
        });
        let checks = vec![failing, tracer("good", &[A], &trace)];
        let table = table(&checks);
        let mut walker = TreeWalker::new(checks, table);

        let violations = walk(&mut walker, &sample());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].key, GENERAL_CHECK_FAILURE);
        assert_eq!(violations[0].line, 1);
        assert_eq!(
            violations[0].message,
            "Check bad failed while processing sample.t: boom"
        );

        let bad_events = trace.lock().iter().filter(|e| e.starts_with("bad:")).count();
        assert_eq!(bad_events, 2, "begin + enter a1, then muted");
        assert!(trace.lock().iter().any(|e| e == "good:enter a2"));

        trace.lock().clear();
        walk(&mut walker, &sample());
        assert!(trace.lock().iter().any(|e| e == "bad:enter a1"));
    }

    struct Panicky;

    impl Check for Panicky {
        fn default_tokens(&self) -> Vec<TokenType> {
            vec![B]
        }
        fn visit_token(&mut self, _node: Node<'_>, _r: &mut Reporter<'_>) -> CheckResult {
            panic!("exploded");
        }
    }

    #[test]
    fn panics_are_contained() {
        let checks = vec![RegisteredCheck {
            meta: CheckMeta::new("Panicky"),
            check: Box::new(Panicky),
        }];
        let table = table(&checks);
        let mut walker = TreeWalker::new(checks, table);
        let violations = walk(&mut walker, &sample());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].args[2], "exploded");
        assert_eq!(violations[0].line, 2);
    }

    #[test]
    fn deep_tree_walk_is_iterative() {
        let trace = Trace::default();
        let checks = vec![tracer("t", &[B], &trace)];
        let table = table(&checks);
        let mut walker = TreeWalker::new(checks, table);

        let mut ast = Ast::with_root(ROOT, "root", 1, 0);
        let mut parent = ast.root_id().unwrap();
        for _ in 0..100_000 {
            parent = ast.append_new(parent, A, "a", 1, 0);
        }
        ast.append_new(parent, B, "leaf", 1, 0);
        walk(&mut walker, &ast);
        assert_eq!(trace.lock().len(), 4);
    }
}
