//! Generator state: output lines, indentation and entity naming
use indexmap::IndexMap;
use crate::ir::{Entities, Entity, EntityId};

/// JavaScript generator core context
pub struct JsGenerator<'p> {
    pub entities: &'p Entities,
    pub lines: Vec<String>,
    pub indent: usize,
    pub indent_width: usize,
    /// Rendering ordinal per entity, in order of first use.
    pub names: IndexMap<EntityId, usize>,
    /// Class whose methods are being generated; its fields and methods
    /// render through `this`.
    pub current_class: Option<EntityId>,
}

impl<'p> JsGenerator<'p> {
    pub fn new(entities: &'p Entities, indent_width: usize) -> Self {
        Self {
            entities,
            lines: Vec::new(),
            indent: 0,
            indent_width,
            names: IndexMap::new(),
            current_class: None,
        }
    }

    pub fn emit_line(&mut self, line: &str) {
        let padding = " ".repeat(self.indent * self.indent_width);
        self.lines.push(format!("{}{}", padding, line));
    }

    /// Emits `header`, the indented body produced by `body`, then `}`.
    pub fn emit_block(&mut self, header: &str, body: impl FnOnce(&mut Self)) {
        self.emit_line(header);
        self.indent += 1;
        body(self);
        self.indent -= 1;
        self.emit_line("}");
    }

    /// `name_N`, where N is the order in which the entity was first
    /// rendered. Distinct entities sharing a source name never collide.
    pub fn target_name(&mut self, id: EntityId) -> String {
        let next = self.names.len() + 1;
        let ordinal = *self.names.entry(id).or_insert(next);
        format!("{}_{}", self.entities.name(id), ordinal)
    }

    /// Whether `id` is a field or method of the class being generated.
    pub fn is_own_member(&self, id: EntityId) -> bool {
        let Some(class_id) = self.current_class else {
            return false;
        };
        match self.entities.get(id) {
            Entity::Function(function) => function.class == Some(class_id),
            Entity::Parameter(_) => self
                .entities
                .class(class_id)
                .is_some_and(|class| class.constructor_params.contains(&id)),
            _ => false,
        }
    }

    pub fn finish(self) -> Vec<String> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Variable;
    use crate::types::Type;

    fn variable(entities: &mut Entities, name: &str) -> EntityId {
        entities.alloc(Entity::Variable(Variable { name: name.into(), mutable: false, ty: Type::Int }))
    }

    #[test]
    fn test_names_follow_first_use() {
        let mut entities = Entities::new();
        let a = variable(&mut entities, "x");
        let b = variable(&mut entities, "x");
        let mut generator = JsGenerator::new(&entities, 2);
        assert_eq!(generator.target_name(b), "x_1");
        assert_eq!(generator.target_name(a), "x_2");
        assert_eq!(generator.target_name(b), "x_1");
    }

    #[test]
    fn test_blocks_are_indented() {
        let entities = Entities::new();
        let mut generator = JsGenerator::new(&entities, 4);
        generator.emit_block("if (true) {", |g| {
            g.emit_block("while (false) {", |g| g.emit_line("break;"));
        });
        assert_eq!(
            generator.finish(),
            vec!["if (true) {", "    while (false) {", "        break;", "    }", "}"]
        );
    }
}
