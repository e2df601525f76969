//! `match` over enum values.

use tern_diagnostic::ErrorCode;
use tern_ir::{EnumKeywordKind, ProgramNode, TokenCursor};

use super::Sequencer;
use crate::error::{SemaErrorKind, SemaResult};
use crate::symbols::MultiTableSymbol;

impl Sequencer<'_> {
    #[tracing::instrument(level = "debug", skip_all)]
    pub(super) fn sequence_match(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<ProgramNode> {
        self.expect(cursor, "match")?;
        let subject = self.parse_expr(cursor)?.auto_deref();
        let enum_name = subject.ty.atomic_name().unwrap_or_default().to_string();
        let Some(data) = self.session.types.get_enum(&enum_name).cloned() else {
            return Err(self.error(SemaErrorKind::mismatch("an enum", &subject.ty, "`match` subject")));
        };

        let inner = self.take_balanced(cursor, "{", "}")?;
        let mut arms = TokenCursor::new(inner);
        let mut children = vec![ProgramNode::atom(format!("switch (({}).tag) {{\n", subject.text))];
        let mut handled: Vec<String> = Vec::new();
        let mut has_default = false;

        while let Some(tok) = arms.peek() {
            self.session.track(tok);
            if has_default {
                return Err(self.error(SemaErrorKind::DefaultNotLast));
            }
            match tok.text.as_str() {
                "case" => {
                    arms.next();
                    let option = self.identifier(&mut arms, "enum option")?;
                    let (Some(tag), Some(payload)) = (data.discriminant(&option.text), data.payload(&option.text))
                    else {
                        return Err(self.error(SemaErrorKind::UnknownOption {
                            ty: enum_name.clone(),
                            option: option.text.clone(),
                        }));
                    };
                    if handled.contains(&option.text) {
                        return Err(self.error(SemaErrorKind::DuplicateCase {
                            option: option.text.clone(),
                        }));
                    }
                    handled.push(option.text.clone());

                    let body = if arms.at("(") {
                        let capture = self.take_balanced(&mut arms, "(", ")")?;
                        let [variable] = capture else {
                            return Err(self.error(SemaErrorKind::ExpectedToken {
                                expected: "capture name".to_string(),
                                found: capture.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" "),
                            }));
                        };
                        if payload.is_null() {
                            return Err(self.error(SemaErrorKind::mismatch(
                                "an option with a payload",
                                format!("`{}`", option.text),
                                "`case` capture",
                            )));
                        }

                        // The capture aliases the payload: bound for the body
                        // only, never destroyed.
                        self.open_frame();
                        self.session.table.insert(
                            &variable.text,
                            MultiTableSymbol::variable(payload.clone(), variable.file.as_ref()),
                        );
                        let body = self.sequence_body(&mut arms);
                        self.discard_frame();
                        let mut body = body?;
                        if let Some(stmts) = body.children_mut() {
                            let binding = format!(
                                "{} = ({}).data.{}",
                                payload.c_declaration(&variable.text),
                                subject.text,
                                option.text
                            );
                            stmts.insert(0, ProgramNode::line(vec![ProgramNode::atom(binding)]));
                        }
                        body
                    } else {
                        self.sequence_body(&mut arms)?
                    };

                    children.push(ProgramNode::enum_keyword(
                        EnumKeywordKind::Case,
                        vec![
                            ProgramNode::atom(format!("case {tag}: ")),
                            body,
                            ProgramNode::atom("break;\n"),
                        ],
                    ));
                }
                "default" => {
                    arms.next();
                    let body = self.sequence_body(&mut arms)?;
                    children.push(ProgramNode::enum_keyword(
                        EnumKeywordKind::Default,
                        vec![ProgramNode::atom("default: "), body, ProgramNode::atom("break;\n")],
                    ));
                    has_default = true;
                }
                _ => {
                    return Err(self.error(SemaErrorKind::ExpectedToken {
                        expected: "`case` or `default`".to_string(),
                        found: tok.text.clone(),
                    }));
                }
            }
        }
        children.push(ProgramNode::atom("}\n"));

        if !has_default && self.session.config.warn_unhandled_options {
            let missing: Vec<&str> = data
                .options
                .iter()
                .filter(|o| !handled.contains(*o))
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                self.session.warn(
                    ErrorCode::W0001,
                    format!("`match` on `{enum_name}` does not handle {}", missing.join(", ")),
                );
            }
        }
        Ok(ProgramNode::enum_keyword(EnumKeywordKind::Match, children))
    }
}
