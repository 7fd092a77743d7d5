//! The stack of constructs the parser is currently inside.
//!
//! Frames are pushed on entering a function, block, loop, label, switch or
//! module and popped on leaving it. Statements are appended to the nearest
//! block frame; a function's body is the block frame pushed right after it.
//! Label and jump-target lookups never look past the innermost function.

use crate::namespace::NamespaceId;
use esfront_ast::{
    BlockFlags, ExportEntry, FunctionFlags, FunctionId, FunctionKind, IdentNode, ImportEntry, ParserState, Statement,
};
use esfront_lexer::Token;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Function,
    Block,
    Loop,
    Label,
    Switch,
    Module,
}

/// A function under construction.
#[derive(Debug)]
pub struct FunctionFrame<'a> {
    pub id: FunctionId,
    /// Offset of the token that starts the function.
    pub start: u32,
    pub line: u32,
    pub ident: IdentNode<'a>,
    pub name: String,
    pub kind: FunctionKind,
    pub flags: FunctionFlags,
    pub parameters: Vec<IdentNode<'a>>,
    parameter_names: FxHashSet<&'a str>,
    /// The first parameter whose name was already bound.
    pub duplicate_parameter: Option<IdentNode<'a>>,
    pub simple_parameter_list: bool,
    /// Statements desugared from parameter initializers, run before the body.
    pub parameter_statements: Vec<Statement<'a>>,
    /// Hoisted declarations, prepended to the body when it is finished.
    pub function_declarations: Vec<Statement<'a>>,
    pub end_parser_state: Option<ParserState>,
    pub last_token: Token,
    pub namespace: NamespaceId,
}

impl<'a> FunctionFrame<'a> {
    pub fn new(
        id: FunctionId,
        start: u32,
        line: u32,
        ident: IdentNode<'a>,
        name: String,
        kind: FunctionKind,
        namespace: NamespaceId,
    ) -> Self {
        Self {
            id,
            start,
            line,
            ident,
            name,
            kind,
            flags: FunctionFlags::empty(),
            parameters: Vec::new(),
            parameter_names: FxHashSet::default(),
            duplicate_parameter: None,
            simple_parameter_list: true,
            parameter_statements: Vec::new(),
            function_declarations: Vec::new(),
            end_parser_state: None,
            last_token: Token::default(),
            namespace,
        }
    }

    #[inline]
    pub fn set_flag(&mut self, flag: FunctionFlags) {
        self.flags |= flag;
    }

    #[inline]
    pub fn is_strict(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_STRICT)
    }

    #[inline]
    pub fn is_program(&self) -> bool {
        self.flags.contains(FunctionFlags::IS_PROGRAM)
    }

    #[inline]
    pub fn is_arrow(&self) -> bool {
        self.kind == FunctionKind::Arrow
    }

    #[inline]
    pub fn is_generator(&self) -> bool {
        self.kind == FunctionKind::Generator
    }

    /// Note a bound parameter name, remembering the first duplicate.
    pub fn add_parameter_binding(&mut self, ident: IdentNode<'a>) {
        if !self.parameter_names.insert(ident.name) && self.duplicate_parameter.is_none() {
            self.duplicate_parameter = Some(ident);
        }
    }
}

#[derive(Debug)]
pub struct BlockFrame<'a> {
    pub flags: BlockFlags,
    pub statements: Vec<Statement<'a>>,
}

#[derive(Debug)]
pub struct LabelFrame<'a> {
    pub name: &'a str,
}

/// Import and export entries collected while parsing a module.
#[derive(Debug)]
pub struct ModuleFrame<'a> {
    pub name: String,
    pub requested_modules: Vec<&'a str>,
    pub imports: Vec<ImportEntry<'a>>,
    pub exports: Vec<ExportEntry<'a>>,
    pub export_names: FxHashSet<&'a str>,
}

impl<'a> ModuleFrame<'a> {
    pub fn new(name: String) -> Self {
        Self {
            name,
            requested_modules: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            export_names: FxHashSet::default(),
        }
    }

    pub fn add_module_request(&mut self, request: &'a str) {
        if !self.requested_modules.contains(&request) {
            self.requested_modules.push(request);
        }
    }
}

#[derive(Debug)]
pub enum Frame<'a> {
    Function(Box<FunctionFrame<'a>>),
    Block(BlockFrame<'a>),
    Loop,
    Label(LabelFrame<'a>),
    Switch,
    Module(ModuleFrame<'a>),
}

impl<'a> Frame<'a> {
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Function(_) => FrameKind::Function,
            Frame::Block(_) => FrameKind::Block,
            Frame::Loop => FrameKind::Loop,
            Frame::Label(_) => FrameKind::Label,
            Frame::Switch => FrameKind::Switch,
            Frame::Module(_) => FrameKind::Module,
        }
    }
}

#[derive(Debug, Default)]
pub struct ParserContext<'a> {
    frames: Vec<Frame<'a>>,
}

impl<'a> ParserContext<'a> {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push(&mut self, frame: Frame<'a>) {
        self.frames.push(frame);
    }

    /// Pop the innermost frame, which must be of kind `expected`.
    pub fn pop(&mut self, expected: FrameKind) -> Frame<'a> {
        match self.frames.pop() {
            Some(frame) if frame.kind() == expected => frame,
            Some(frame) => panic!("parser context out of balance: expected {:?}, found {:?}", expected, frame.kind()),
            None => panic!("parser context out of balance: expected {:?}, found nothing", expected),
        }
    }

    pub fn pop_function(&mut self) -> FunctionFrame<'a> {
        match self.pop(FrameKind::Function) {
            Frame::Function(function) => *function,
            _ => unreachable!(),
        }
    }

    pub fn pop_block(&mut self) -> BlockFrame<'a> {
        match self.pop(FrameKind::Block) {
            Frame::Block(block) => block,
            _ => unreachable!(),
        }
    }

    pub fn pop_module(&mut self) -> ModuleFrame<'a> {
        match self.pop(FrameKind::Module) {
            Frame::Module(module) => module,
            _ => unreachable!(),
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Drop every frame above `depth`, used when a statement is abandoned.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    pub fn current_function(&self) -> Option<&FunctionFrame<'a>> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Function(function) => Some(&**function),
            _ => None,
        })
    }

    pub fn current_function_mut(&mut self) -> Option<&mut FunctionFrame<'a>> {
        self.frames.iter_mut().rev().find_map(|frame| match frame {
            Frame::Function(function) => Some(&mut **function),
            _ => None,
        })
    }

    /// Enclosing functions, innermost first.
    pub fn functions_mut(&mut self) -> impl Iterator<Item = &mut FunctionFrame<'a>> {
        self.frames.iter_mut().rev().filter_map(|frame| match frame {
            Frame::Function(function) => Some(&mut **function),
            _ => None,
        })
    }

    pub fn current_block(&self) -> Option<&BlockFrame<'a>> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Block(block) => Some(block),
            _ => None,
        })
    }

    pub fn current_block_mut(&mut self) -> Option<&mut BlockFrame<'a>> {
        self.frames.iter_mut().rev().find_map(|frame| match frame {
            Frame::Block(block) => Some(block),
            _ => None,
        })
    }

    pub fn current_module_mut(&mut self) -> Option<&mut ModuleFrame<'a>> {
        self.frames.iter_mut().rev().find_map(|frame| match frame {
            Frame::Module(module) => Some(module),
            _ => None,
        })
    }

    pub fn append_statement(&mut self, statement: Statement<'a>) {
        if let Some(block) = self.current_block_mut() {
            block.statements.push(statement);
        }
    }

    pub fn prepend_statement(&mut self, statement: Statement<'a>) {
        if let Some(block) = self.current_block_mut() {
            block.statements.insert(0, statement);
        }
    }

    pub fn last_statement(&self) -> Option<&Statement<'a>> {
        self.current_block().and_then(|block| block.statements.last())
    }

    /// Frames of the innermost function, innermost first, with their indices.
    fn function_frames(&self) -> impl Iterator<Item = (usize, &Frame<'a>)> {
        self.frames
            .iter()
            .enumerate()
            .rev()
            .take_while(|(_, frame)| frame.kind() != FrameKind::Function)
    }

    pub fn find_label(&self, name: &str) -> Option<&LabelFrame<'a>> {
        self.find_label_index(name).and_then(|index| match &self.frames[index] {
            Frame::Label(label) => Some(label),
            _ => None,
        })
    }

    fn find_label_index(&self, name: &str) -> Option<usize> {
        self.function_frames().find_map(|(index, frame)| match frame {
            Frame::Label(label) if label.name == name => Some(index),
            _ => None,
        })
    }

    /// Index of the frame a `break` leaves: the nearest loop or switch, or
    /// for a labeled break the construct the label is attached to.
    pub fn get_breakable(&self, label: Option<&str>) -> Option<usize> {
        match label {
            Some(name) => {
                let label_index = self.find_label_index(name)?;
                (label_index + 1..self.frames.len()).find(|&index| {
                    matches!(
                        self.frames[index].kind(),
                        FrameKind::Block | FrameKind::Loop | FrameKind::Switch
                    )
                })
            }
            None => self
                .function_frames()
                .find(|(_, frame)| matches!(frame.kind(), FrameKind::Loop | FrameKind::Switch))
                .map(|(index, _)| index),
        }
    }

    /// Index of the loop a `continue` restarts.
    pub fn get_continue_to(&self, label: Option<&str>) -> Option<usize> {
        match label {
            Some(name) => {
                let label_index = self.find_label_index(name)?;
                (label_index + 1..self.frames.len()).find(|&index| self.frames[index].kind() == FrameKind::Loop)
            }
            None => self
                .function_frames()
                .find(|(_, frame)| frame.kind() == FrameKind::Loop)
                .map(|(index, _)| index),
        }
    }

    pub fn is_in_loop(&self) -> bool {
        self.get_continue_to(None).is_some()
    }

    /// Whether the innermost breakable construct is a switch.
    pub fn in_unprotected_switch_context(&self) -> bool {
        self.function_frames()
            .find(|(_, frame)| matches!(frame.kind(), FrameKind::Loop | FrameKind::Switch))
            .map_or(false, |(_, frame)| frame.kind() == FrameKind::Switch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::Namespace;
    use esfront_core::TextRange;

    fn function(name: &'static str) -> Frame<'static> {
        Frame::Function(Box::new(FunctionFrame::new(
            FunctionId(0),
            0,
            1,
            IdentNode::new(TextRange::empty(0), name),
            name.to_string(),
            FunctionKind::Normal,
            Namespace::ROOT,
        )))
    }

    fn block() -> Frame<'static> {
        Frame::Block(BlockFrame {
            flags: BlockFlags::empty(),
            statements: Vec::new(),
        })
    }

    #[test]
    fn test_labels_do_not_cross_functions() {
        let mut context = ParserContext::new();
        context.push(function("outer"));
        context.push(block());
        context.push(Frame::Label(LabelFrame { name: "l" }));
        context.push(block());
        assert!(context.find_label("l").is_some());
        assert_eq!(context.get_breakable(Some("l")), Some(3));
        assert_eq!(context.get_continue_to(Some("l")), None);

        context.push(function("inner"));
        context.push(block());
        assert!(context.find_label("l").is_none());
        assert_eq!(context.get_breakable(Some("l")), None);
    }

    #[test]
    fn test_unlabeled_targets() {
        let mut context = ParserContext::new();
        context.push(function("f"));
        context.push(block());
        assert_eq!(context.get_breakable(None), None);
        assert!(!context.is_in_loop());

        context.push(Frame::Loop);
        context.push(block());
        context.push(Frame::Switch);
        assert_eq!(context.get_breakable(None), Some(4));
        assert_eq!(context.get_continue_to(None), Some(2));
        assert!(context.in_unprotected_switch_context());

        context.pop(FrameKind::Switch);
        assert!(!context.in_unprotected_switch_context());
        assert!(context.is_in_loop());
    }

    #[test]
    fn test_statements_go_to_nearest_block() {
        let mut context = ParserContext::new();
        context.push(function("f"));
        context.push(block());
        let first = Statement::Debugger(esfront_ast::DebuggerNode {
            range: TextRange::new(0, 8),
            line: 1,
        });
        let second = Statement::Empty(esfront_ast::EmptyNode {
            range: TextRange::new(9, 10),
            line: 1,
        });
        context.append_statement(first);
        context.prepend_statement(second);
        assert_eq!(context.last_statement(), Some(&first));

        let body = context.pop_block();
        assert_eq!(body.statements, vec![second, first]);
        assert_eq!(context.pop_function().name, "f");
    }

    #[test]
    #[should_panic(expected = "out of balance")]
    fn test_mismatched_pop_panics() {
        let mut context = ParserContext::new();
        context.push(Frame::Loop);
        context.pop(FrameKind::Switch);
    }

    #[test]
    fn test_duplicate_parameter_is_recorded_once() {
        let mut frame = FunctionFrame::new(
            FunctionId(0),
            0,
            1,
            IdentNode::new(TextRange::empty(0), "f"),
            "f".to_string(),
            FunctionKind::Normal,
            Namespace::ROOT,
        );
        frame.add_parameter_binding(IdentNode::new(TextRange::new(11, 12), "a"));
        frame.add_parameter_binding(IdentNode::new(TextRange::new(14, 15), "a"));
        frame.add_parameter_binding(IdentNode::new(TextRange::new(17, 18), "a"));
        assert_eq!(frame.duplicate_parameter.map(|ident| ident.range.pos), Some(14));
    }
}
