//! `let` declarations: variables, functions, structs, enums and generic
//! templates.

use rustc_hash::FxHashMap;
use tern_ir::{KeywordKind, ProgramNode, Token, TokenCursor};
use tern_types::{Mangler, Param, Primitive, Type, TypeNode};

use super::{Local, ScopeFrame, Sequencer};
use crate::error::{ResultExt, SemaError, SemaErrorKind, SemaResult};
use crate::generics::{self, split_top_level, GenericInfo, GenericKind};
use crate::registry::{EnumLookupData, StructLookupData};
use crate::symbols::{Defined, MultiTableSymbol, AUTOGEN_SENTINEL};

/// C initializer giving a fresh value of `ty` its zero state. `None` for
/// struct and enum values, which are constructed with `New`.
pub(super) fn zero_initializer(ty: &Type) -> Option<&'static str> {
    match ty.first() {
        Some(TypeNode::SizedArray(_)) => Some("{0}"),
        Some(TypeNode::Pointer | TypeNode::UnsizedArray | TypeNode::FunctionStart) => Some("NULL"),
        _ => match ty.primitive()? {
            Primitive::Bool => Some("false"),
            Primitive::Str | Primitive::Void => Some("NULL"),
            _ => Some("0"),
        },
    }
}

fn declares(frame: &ScopeFrame, name: &str) -> bool {
    frame.declared.iter().any(|l| l.name == name)
}

/// Whether `ty` can hold a value at all.
fn is_value_type(ty: &Type) -> bool {
    !ty.is_null() && ty.primitive() != Some(Primitive::Void)
}

fn c_params(params: &[Param]) -> String {
    if params.is_empty() {
        return "void".to_string();
    }
    params
        .iter()
        .map(|p| p.ty.c_declaration(p.name.as_deref().unwrap_or("")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Which lifecycle function a body belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Lifecycle {
    New,
    Del,
}

impl Sequencer<'_> {
    /// One top-level declaration.
    pub(super) fn sequence_declaration(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Vec<ProgramNode>> {
        let tok = self.peek_or_end(cursor, "declaration")?;
        if tok.is_intrinsic() {
            return Ok(self.sequence_intrinsic(cursor)?.into_iter().collect());
        }
        if !tok.is("let") {
            return Err(self.error(SemaErrorKind::ExpectedToken {
                expected: "declaration".to_string(),
                found: tok.text.clone(),
            }));
        }
        self.sequence_let(cursor)
    }

    /// `let …` at top level or inside a scope. Only variables may be declared
    /// inside a scope.
    pub(super) fn sequence_let(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Vec<ProgramNode>> {
        let let_tok = self.expect(cursor, "let")?;
        let name = self.identifier(cursor, "declaration name")?;
        let top_level = self.frames.is_empty();

        let type_decl = cursor.at(":")
            && cursor
                .peek_nth(1)
                .is_some_and(|t| t.is("struct") || t.is("enum"));

        let misplaced = match cursor.peek_text() {
            Some("<") => Some("a generic declaration"),
            Some("(") => Some("a function declaration"),
            Some(":") if type_decl => Some("a type declaration"),
            _ => None,
        };
        if let (false, Some(what)) = (top_level, misplaced) {
            return Err(self.error(SemaErrorKind::MisplacedDeclaration { what }));
        }

        match cursor.peek_text() {
            Some("<") => self.sequence_generic(cursor, let_tok, name),
            Some("(") => self.sequence_function(cursor, name),
            Some(":") if type_decl => self.sequence_type(cursor, &name.text),
            _ => self.sequence_variables(cursor, name),
        }
    }

    // -- Variables --

    fn sequence_variables(&mut self, cursor: &mut TokenCursor<'_>, first: &Token) -> SemaResult<Vec<ProgramNode>> {
        let mut names = vec![first];
        while cursor.eat(",") {
            names.push(self.identifier(cursor, "variable name")?);
        }
        self.expect(cursor, ":")?;
        let ty = self.parse_type(cursor)?;
        self.expect(cursor, ";")?;

        if !is_value_type(&ty) {
            return Err(self.error(SemaErrorKind::mismatch(
                "a value type",
                &ty,
                format!("declaration of `{}`", first.text),
            )));
        }

        let mut nodes = Vec::with_capacity(names.len());
        for name in names {
            self.session.track(name);
            if Mangler::is_mangled(&name.text) {
                return Err(self.error(SemaErrorKind::ReservedIdentifier {
                    name: name.text.clone(),
                }));
            }
            if self.frames.is_empty() {
                nodes.push(self.declare_global(name, &ty)?);
            } else {
                let at = self.frames.last().map_or(0, |f| f.position + nodes.len());
                nodes.extend(self.declare_local(name, &ty, at)?);
            }
        }
        Ok(nodes)
    }

    fn declare_global(&mut self, name: &Token, ty: &Type) -> SemaResult<ProgramNode> {
        if self.session.table.lookup_variable(&name.text).is_some() {
            return Err(self.error(SemaErrorKind::Redefinition {
                what: "global variable",
                name: name.text.clone(),
            }));
        }
        self.session
            .table
            .insert(&name.text, MultiTableSymbol::variable(ty.clone(), name.file.as_ref()));
        tracing::trace!(name = %name.text, ty = %ty, "global");
        Ok(ProgramNode::line(vec![ProgramNode::atom(format!(
            "static {}",
            ty.c_declaration(&name.text)
        ))]))
    }

    fn declare_local(&mut self, name: &Token, ty: &Type, at: usize) -> SemaResult<Vec<ProgramNode>> {
        let redefined = match self.frames.as_slice() {
            [] => return Ok(Vec::new()),
            [.., params, body] if params.parameters => {
                declares(body, &name.text) || declares(params, &name.text)
            }
            [.., frame] => declares(frame, &name.text),
        };
        if redefined {
            return Err(self.error(SemaErrorKind::Redefinition {
                what: "variable",
                name: name.text.clone(),
            }));
        }
        let Some(frame) = self.frames.last_mut() else {
            return Ok(Vec::new());
        };
        frame.declared.push(Local {
            name: name.text.clone(),
            ty: ty.clone(),
            at,
        });
        self.session
            .table
            .insert(&name.text, MultiTableSymbol::variable(ty.clone(), name.file.as_ref()));

        let decl = ty.c_declaration(&name.text);
        if let Some(init) = zero_initializer(ty) {
            return Ok(vec![ProgramNode::line(vec![ProgramNode::atom(format!("{decl} = {init}"))])]);
        }
        let construct = self.lifecycle_call("New", ty, format!("&{}", name.text))?;
        Ok(vec![
            ProgramNode::line(vec![ProgramNode::atom(decl)]),
            ProgramNode::line(vec![ProgramNode::atom(construct)]),
        ])
    }

    /// C text of `op(target)` for a value of type `ty`, where `target` is the
    /// value's address.
    pub(super) fn lifecycle_call(&mut self, op: &str, ty: &Type, target: String) -> SemaResult<String> {
        let resolved = self.session.resolve_call(op, &[ty.address_of()])?;
        Ok(self.session.emit_call(&resolved, vec![target]))
    }

    // -- Functions --

    /// `(name: T, …)` after a function name.
    fn parse_params(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Vec<Param>> {
        let inner = self.take_balanced(cursor, "(", ")")?;
        let mut params = Vec::new();
        for part in split_top_level(inner) {
            let mut param = TokenCursor::new(part);
            let name = self.identifier(&mut param, "parameter name")?;
            self.expect(&mut param, ":")?;
            let ty = self.parse_type(&mut param)?;
            self.expect_end(&param, "`,` or `)`")?;
            if !is_value_type(&ty) {
                return Err(self.error(SemaErrorKind::mismatch(
                    "a value type",
                    &ty,
                    format!("parameter `{}`", name.text),
                )));
            }
            params.push(Param::named(name.text.clone(), ty));
        }
        Ok(params)
    }

    /// `: T` after a parameter list; `NULL` when absent or `void`.
    fn parse_return_type(&mut self, cursor: &mut TokenCursor<'_>) -> SemaResult<Type> {
        if !cursor.eat(":") {
            return Ok(Type::null());
        }
        let ty = self.parse_type(cursor)?;
        Ok(if is_value_type(&ty) { ty } else { Type::null() })
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name.text))]
    fn sequence_function(&mut self, cursor: &mut TokenCursor<'_>, name: &Token) -> SemaResult<Vec<ProgramNode>> {
        self.function(cursor, name)
            .with_context(|| format!("in function `{}`", name.text))
    }

    fn function(&mut self, cursor: &mut TokenCursor<'_>, name_tok: &Token) -> SemaResult<Vec<ProgramNode>> {
        let name = name_tok.text.as_str();
        let file = name_tok.file.to_string();
        if Mangler::is_mangled(name) {
            return Err(self.error(SemaErrorKind::ReservedIdentifier { name: name.to_string() }));
        }

        let params = self.parse_params(cursor)?;
        let ret = self.parse_return_type(cursor)?;
        let ty = Type::function(&params, &ret);
        let mangled = self.session.mangler.mangle_function(name, &ty);
        let header = format!("{} {mangled}({})", ret.c_type(), c_params(&params));

        if cursor.eat(";") {
            self.session
                .table
                .define_function(name, MultiTableSymbol::function(ty, None, file))
                .map_err(|_| self.redefinition("function", name))?;
            tracing::trace!(symbol = %mangled, "forward declaration");
            return Ok(vec![ProgramNode::line(vec![ProgramNode::atom(header)])]);
        }

        // Defined as a placeholder first so the body can call itself.
        let placeholder = MultiTableSymbol::function(ty.clone(), None, file.clone());
        match self.session.table.define_function(name, placeholder) {
            Ok(Defined::Inserted | Defined::Replaced) => {}
            Ok(Defined::AlreadyDefined) | Err(_) => return Err(self.redefinition("function", name)),
        }

        let mut body = self.function_body(cursor, &params, &ret)?;
        if let Some((op, receiver, struct_name)) = self.user_lifecycle(name, &params) {
            let members = self.member_lifecycle(op, &struct_name, &receiver)?;
            if let Some(children) = body.children_mut() {
                match op {
                    Lifecycle::New => {
                        children.splice(0..0, members);
                    }
                    Lifecycle::Del => {
                        let at = match children.last() {
                            Some(last) if last.is_keyword(KeywordKind::Return) => children.len() - 1,
                            _ => children.len(),
                        };
                        children.splice(at..at, members);
                    }
                }
            }
        }

        let node = ProgramNode::keyword(
            KeywordKind::Function,
            vec![ProgramNode::atom(format!("{header} ")), body],
        );
        self.session
            .table
            .define_function(name, MultiTableSymbol::function(ty, Some(node.clone()), file))
            .map_err(|_| self.redefinition("function", name))?;
        tracing::debug!(symbol = %mangled, "defined function");
        Ok(vec![node])
    }

    /// Sequence a function body with the parameters bound.
    fn function_body(&mut self, cursor: &mut TokenCursor<'_>, params: &[Param], ret: &Type) -> SemaResult<ProgramNode> {
        self.frames.push(ScopeFrame {
            snapshot: self.session.table.snapshot(),
            declared: Vec::new(),
            position: 0,
            parameters: true,
        });
        let saved = self.return_type.replace(ret.clone());

        let result = self.bind_params(params).and_then(|()| self.sequence_scope(cursor));

        self.return_type = saved;
        if let Some(frame) = self.frames.pop() {
            // Parameters are owned by the caller: nothing to destroy.
            self.session.table.restore(frame.snapshot);
        }
        result
    }

    fn bind_params(&mut self, params: &[Param]) -> SemaResult<()> {
        let file = self.session.location().file.clone();
        for param in params {
            let name = param.name.clone().unwrap_or_default();
            let Some(frame) = self.frames.last_mut() else {
                break;
            };
            if frame.declared.iter().any(|l| l.name == name) {
                return Err(self.redefinition("parameter", &name));
            }
            frame.declared.push(Local {
                name: name.clone(),
                ty: param.ty.clone(),
                at: 0,
            });
            self.session
                .table
                .insert(&name, MultiTableSymbol::variable(param.ty.clone(), file.as_str()));
        }
        Ok(())
    }

    /// A user `New`/`Del` taking a single `*Struct`: the lifecycle, the
    /// receiver parameter and the struct name.
    fn user_lifecycle(&self, name: &str, params: &[Param]) -> Option<(Lifecycle, String, String)> {
        let op = match name {
            "New" => Lifecycle::New,
            "Del" => Lifecycle::Del,
            _ => return None,
        };
        let [param] = params else {
            return None;
        };
        let pointee = param.ty.deref()?;
        let struct_name = pointee.atomic_name()?;
        self.session.types.get_struct(struct_name)?;
        Some((op, param.name.clone()?, struct_name.to_string()))
    }

    /// Per-member construction or destruction through `receiver`, a pointer
    /// to the struct.
    fn member_lifecycle(&mut self, op: Lifecycle, struct_name: &str, receiver: &str) -> SemaResult<Vec<ProgramNode>> {
        let Some(data) = self.session.types.get_struct(struct_name).cloned() else {
            return Ok(Vec::new());
        };
        let mut lines = Vec::new();
        match op {
            Lifecycle::New => {
                for (member, ty) in data.iter() {
                    let place = format!("{receiver}->{member}");
                    let text = if matches!(ty.first(), Some(TypeNode::SizedArray(_))) {
                        format!("memset({place}, 0, sizeof({place}))")
                    } else if let Some(init) = zero_initializer(ty) {
                        format!("{place} = {init}")
                    } else {
                        self.lifecycle_call("New", ty, format!("&{place}"))?
                    };
                    lines.push(ProgramNode::line(vec![ProgramNode::atom(text)]));
                }
            }
            Lifecycle::Del => {
                for (member, ty) in data.iter().rev().filter(|(_, ty)| !ty.is_trivial()) {
                    let text = self.lifecycle_call("Del", ty, format!("&{receiver}->{member}"))?;
                    lines.push(ProgramNode::line(vec![ProgramNode::atom(text)]));
                }
            }
        }
        Ok(lines)
    }

    fn redefinition(&self, what: &'static str, name: &str) -> SemaError {
        self.error(SemaErrorKind::Redefinition {
            what,
            name: name.to_string(),
        })
    }

    // -- Structs and enums --

    /// `: struct { … }` or `: enum { … }` after the type name.
    fn sequence_type(&mut self, cursor: &mut TokenCursor<'_>, name: &str) -> SemaResult<Vec<ProgramNode>> {
        self.expect(cursor, ":")?;
        let keyword = self.next_token(cursor, "`struct` or `enum`")?;
        let what = if keyword.is("struct") { "struct" } else { "enum" };

        if Mangler::is_mangled(name) && !self.session.is_incomplete(name) {
            return Err(self.error(SemaErrorKind::ReservedIdentifier { name: name.to_string() }));
        }
        if self.session.types.is_registered(name) || Primitive::from_name(name).is_some() {
            return Err(self.redefinition(what, name));
        }
        let body = self.take_balanced(cursor, "{", "}")?;

        // The name is usable inside its own body, behind a pointer.
        let was_incomplete = self.session.is_incomplete(name);
        self.session.mark_incomplete(name);
        let result = if what == "struct" {
            self.sequence_struct(name, body)
        } else {
            self.sequence_enum(name, body)
        };
        if !was_incomplete {
            self.session.mark_complete(name);
        }
        result.with_context(|| format!("in {what} `{name}`"))
    }

    /// `NAME : type` (or, for enums, a bare `NAME`) entries of a type body.
    fn parse_fields(&mut self, owner: &str, body: &[Token], payload_optional: bool) -> SemaResult<Vec<(String, Type)>> {
        let parts = split_top_level(body);
        let count = parts.len();
        let mut fields: Vec<(String, Type)> = Vec::with_capacity(count);
        for (i, part) in parts.into_iter().enumerate() {
            // Trailing comma.
            if part.is_empty() && i + 1 == count && i > 0 {
                break;
            }
            let mut field = TokenCursor::new(part);
            let name = self.identifier(&mut field, "member name")?;
            let ty = if payload_optional && field.at_end() {
                Type::null()
            } else {
                self.expect(&mut field, ":")?;
                self.parse_type(&mut field)?
            };
            self.expect_end(&field, "`,`")?;

            if fields.iter().any(|(n, _)| *n == name.text) {
                let what = if payload_optional { "option" } else { "member" };
                return Err(self.redefinition(what, &name.text));
            }
            if ty.atomic_name() == Some(owner) {
                return Err(self.error(SemaErrorKind::mismatch(
                    format!("*{owner}"),
                    &ty,
                    format!("`{}` (a type cannot contain itself)", name.text),
                )));
            }
            if !ty.is_null() && !is_value_type(&ty) {
                return Err(self.error(SemaErrorKind::mismatch("a value type", &ty, format!("`{}`", name.text))));
            }
            fields.push((name.text.clone(), ty));
        }
        Ok(fields)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    fn sequence_struct(&mut self, name: &str, body: &[Token]) -> SemaResult<Vec<ProgramNode>> {
        let mut data = StructLookupData::default();
        for (member, ty) in self.parse_fields(name, body, false)? {
            data.push_member(member, ty);
        }

        let mut definition = format!("struct {name} {{\n");
        if data.members.is_empty() {
            definition.push_str("    uint8_t _empty;\n");
        }
        for (member, ty) in data.iter() {
            definition.push_str(&format!("    {};\n", ty.c_declaration(member)));
        }
        definition.push_str("};\n");

        self.session.types.register_struct(name, data);

        let receiver = "self";
        let new_body = self.member_lifecycle(Lifecycle::New, name, receiver)?;
        let del_body = self.member_lifecycle(Lifecycle::Del, name, receiver)?;

        let mut nodes = vec![
            ProgramNode::atom(format!("typedef struct {name} {name};\n")),
            ProgramNode::atom(definition),
        ];
        nodes.extend(self.register_lifecycle(name, new_body, del_body)?);
        Ok(nodes)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name))]
    fn sequence_enum(&mut self, name: &str, body: &[Token]) -> SemaResult<Vec<ProgramNode>> {
        let mut data = EnumLookupData::default();
        for (option, payload) in self.parse_fields(name, body, true)? {
            data.push_option(option, payload);
        }

        let mut definition = format!("typedef struct {name} {{\n    int32_t tag;\n");
        if data.has_payloads() {
            definition.push_str("    union {\n");
            for (option, payload) in data.iter().filter(|(_, ty)| !ty.is_null()) {
                definition.push_str(&format!("        {};\n", payload.c_declaration(option)));
            }
            definition.push_str("    } data;\n");
        }
        definition.push_str(&format!("}} {name};\n"));

        let new_body = vec![ProgramNode::line(vec![ProgramNode::atom(format!("*self = ({name}){{0}}"))])];

        let mut del_body = Vec::new();
        let owned: Vec<(usize, String, Type)> = data
            .iter()
            .enumerate()
            .filter(|(_, (_, ty))| !ty.is_null() && !ty.is_trivial())
            .map(|(tag, (option, ty))| (tag, option.to_string(), ty.clone()))
            .collect();
        self.session.types.register_enum(name, data);

        if !owned.is_empty() {
            del_body.push(ProgramNode::atom("switch (self->tag) {\n"));
            for (tag, option, ty) in owned {
                let call = self.lifecycle_call("Del", &ty, format!("&self->data.{option}"))?;
                del_body.push(ProgramNode::atom(format!("case {tag}: {call}; break;\n")));
            }
            del_body.push(ProgramNode::atom("}\n"));
        }

        let mut nodes = vec![ProgramNode::atom(definition)];
        nodes.extend(self.register_lifecycle(name, new_body, del_body)?);
        Ok(nodes)
    }

    /// Register autogenerated `New`, `Del` and `Copy` for the type `name` and
    /// return their prototypes. The definitions are emitted at the end of the
    /// program unless the user defines them.
    fn register_lifecycle(
        &mut self,
        name: &str,
        new_body: Vec<ProgramNode>,
        del_body: Vec<ProgramNode>,
    ) -> SemaResult<Vec<ProgramNode>> {
        let value = Type::atomic(name);
        let pointer = value.address_of();
        let copy_body = vec![ProgramNode::line(vec![ProgramNode::atom("*dst = src")])];
        let functions = [
            ("New", vec![Param::named("self", pointer.clone())], new_body),
            ("Del", vec![Param::named("self", pointer.clone())], del_body),
            (
                "Copy",
                vec![Param::named("dst", pointer), Param::named("src", value)],
                copy_body,
            ),
        ];

        let file = self.session.location().file.clone();
        let mut prototypes = Vec::with_capacity(functions.len());
        for (op, params, lines) in functions {
            let ty = Type::function(&params, &Type::null());
            let header = format!(
                "void {}({})",
                self.session.mangler.mangle_function(op, &ty),
                c_params(&params)
            );
            let mut body = vec![ProgramNode::atom(AUTOGEN_SENTINEL)];
            body.extend(lines);
            let node = ProgramNode::keyword(
                KeywordKind::Function,
                vec![ProgramNode::atom(format!("{header} ")), ProgramNode::scope(body)],
            );

            match self
                .session
                .table
                .define_function(op, MultiTableSymbol::function(ty.clone(), Some(node), file.as_str()))
            {
                Ok(Defined::Inserted | Defined::Replaced) => self.session.record_autogen(op, ty),
                Ok(Defined::AlreadyDefined) => {}
                Err(_) => return Err(self.redefinition("function", op)),
            }
            prototypes.push(ProgramNode::line(vec![ProgramNode::atom(header)]));
        }
        Ok(prototypes)
    }

    // -- Generics --

    #[tracing::instrument(level = "debug", skip_all, fields(name = %name.text))]
    fn sequence_generic(
        &mut self,
        cursor: &mut TokenCursor<'_>,
        let_tok: &Token,
        name: &Token,
    ) -> SemaResult<Vec<ProgramNode>> {
        let inner = self.take_balanced(cursor, "<", ">")?;
        let mut param_names = Vec::new();
        for part in split_top_level(inner) {
            let mut param = TokenCursor::new(part);
            let tok = self.identifier(&mut param, "generic parameter name")?;
            self.expect_end(&param, "`,` or `>`")?;
            param_names.push(tok.text.clone());
        }

        if param_names.iter().all(|p| self.session.is_known_type(p)) {
            return self.sequence_concrete_generic(cursor, name, &param_names);
        }

        let tail = self.take_declaration_tail(cursor)?;
        let kind = match (tail.first(), tail.get(1)) {
            (Some(colon), Some(kw)) if colon.is(":") && kw.is("struct") => GenericKind::Struct,
            (Some(colon), Some(kw)) if colon.is(":") && kw.is("enum") => GenericKind::Enum,
            _ => GenericKind::Function,
        };

        let mut info = GenericInfo::new(kind, param_names, name.file.as_ref());
        info.body_tokens = vec![let_tok.clone(), name.clone()];
        info.body_tokens.extend_from_slice(tail);

        if kind == GenericKind::Function {
            let mut tail_cursor = TokenCursor::new(tail);
            let params = self.take_balanced(&mut tail_cursor, "(", ")")?;
            for (i, part) in split_top_level(params).into_iter().enumerate() {
                if i > 0 {
                    info.type_vector_pattern.push(",".to_string());
                }
                let ty_tokens = part.get(2..).unwrap_or(&[]);
                info.type_vector_pattern
                    .extend(ty_tokens.iter().map(|t| t.text.clone()));
            }
            while !tail_cursor.at_end() && !tail_cursor.at("{") && !tail_cursor.at(";") {
                tail_cursor.next();
            }
            if tail_cursor.at("{") {
                let header_len = 2 + tail_cursor.position();
                info.pre_block = info.body_tokens[..header_len].to_vec();
                if let Some(last) = info.pre_block.last().cloned() {
                    info.pre_block.push(Token { text: ";".to_string(), ..last });
                }
            }

            if let Some(nodes) = self.attach_lifecycle_template(&name.text, &info)? {
                return Ok(nodes);
            }
        }

        self.session.generics.register(name.text.clone(), info);
        Ok(Vec::new())
    }

    /// A generic declaration whose parameters all name existing types is an
    /// ordinary declaration.
    fn sequence_concrete_generic(
        &mut self,
        cursor: &mut TokenCursor<'_>,
        name: &Token,
        param_names: &[String],
    ) -> SemaResult<Vec<ProgramNode>> {
        let is_type = cursor.at(":")
            && cursor
                .peek_nth(1)
                .is_some_and(|t| t.is("struct") || t.is("enum"));
        if !is_type {
            return self.sequence_function(cursor, name);
        }

        let substitutions: Vec<Vec<String>> = param_names.iter().map(|p| vec![p.clone()]).collect();
        let mangled = self.session.mangler.mangle_generic(&name.text, &substitutions);
        self.session.mark_incomplete(&mangled);
        let result = self.sequence_type(cursor, &mangled);
        self.session.mark_complete(&mangled);
        result
    }

    /// Tokens of a template declaration after its `<…>` list: up to a
    /// top-level `;` or the end of the first top-level `{}` group.
    fn take_declaration_tail<'t>(&mut self, cursor: &mut TokenCursor<'t>) -> SemaResult<&'t [Token]> {
        let rest = cursor.remaining();
        let mut depth = 0usize;
        let mut end = None;
        for (i, tok) in rest.iter().enumerate() {
            match tok.text.as_str() {
                ";" if depth == 0 => {
                    end = Some(i + 1);
                    break;
                }
                "(" | "[" | "{" => depth += 1,
                ")" | "]" => depth = depth.saturating_sub(1),
                "}" => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        end = Some(i + 1);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(end) = end else {
            return Err(self.error(SemaErrorKind::UnexpectedEnd {
                expected: "end of generic declaration".to_string(),
            }));
        };
        for _ in 0..end {
            if let Some(tok) = cursor.next() {
                self.session.track(tok);
            }
        }
        Ok(&rest[..end])
    }

    /// Attach a `New`/`Del`/`Copy` template whose first parameter is a
    /// pointer to an instance of a struct/enum template, so every instance of
    /// that template gets it. Instances that already exist get it now.
    fn attach_lifecycle_template(&mut self, name: &str, info: &GenericInfo) -> SemaResult<Option<Vec<ProgramNode>>> {
        if !matches!(name, "New" | "Del" | "Copy") {
            return Ok(None);
        }
        let first_param = split_top_level(&info.type_vector_pattern)
            .first()
            .map(|p| p.to_vec())
            .unwrap_or_default();
        let [star, template, open, args @ .., close] = first_param.as_slice() else {
            return Ok(None);
        };
        if star != "*" || open != "<" || close != ">" {
            return Ok(None);
        }
        let Some(target) = self.session.generics.type_template(template) else {
            return Ok(None);
        };
        let args: Vec<&str> = split_top_level(args)
            .into_iter()
            .filter_map(|a| match a {
                [single] => Some(single.as_str()),
                _ => None,
            })
            .collect();
        if args.len() != target.generic_param_names.len()
            || args.len() != info.generic_param_names.len()
            || !args.iter().all(|a| info.generic_param_names.iter().any(|p| p == a))
        {
            return Ok(None);
        }

        // Rename the template's parameters to the type template's.
        let renamed: Vec<Vec<String>> = target.generic_param_names.iter().map(|p| vec![p.clone()]).collect();
        let rename: FxHashMap<&str, &[String]> = args
            .iter()
            .copied()
            .zip(renamed.iter().map(Vec::as_slice))
            .collect();
        let tokens = generics::substitute(&info.body_tokens, &rename);
        let target_params = target.generic_param_names.clone();
        let instances = target.instances.clone();
        let template = template.clone();

        if let Some(target) = self.session.generics.type_template_mut(&template) {
            target.post_block.extend(tokens.iter().cloned());
        }
        tracing::debug!(name, template = %template, instances = instances.len(), "attached lifecycle template");

        let mut nodes = Vec::new();
        for substitutions in &instances {
            let map: FxHashMap<&str, &[String]> = target_params
                .iter()
                .map(String::as_str)
                .zip(substitutions.iter().map(Vec::as_slice))
                .collect();
            let instance = generics::substitute(&tokens, &map);
            nodes.extend(self.sequence_declarations(&mut TokenCursor::new(&instance))?);
        }
        self.session.push_pending(nodes);
        Ok(Some(Vec::new()))
    }
}
