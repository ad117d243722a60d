//! TypeScript emitter
//!
//! Complex types become `I{Name}` interfaces, enums become string enums
//! and methods are members of an `IApiMethods` interface. Anonymous
//! object shapes are written inline where they are used.

use crate::error::Result;
use crate::model::names::safe_name;
use crate::model::{ApiModel, EnumValue, MethodContract, Parameter, Property, Type, TypeKind, TypeOrigin};

use super::config::RenderProfile;
use super::{body_type_name, comment_block, declared_name, method_header, string_literal, CodeGenerator, RenderStack};

pub struct TypeScriptGenerator {
    profile: RenderProfile,
}

impl TypeScriptGenerator {
    pub fn new(profile: RenderProfile) -> Self {
        Self { profile }
    }

    /// Interface name of a complex type
    fn interface_name(name: &str) -> String {
        format!("I{}", name)
    }

    fn type_ref(&self, api: &ApiModel, name: &str, stack: &mut RenderStack) -> Result<String> {
        let ty = api.require_type(name)?;
        if ty.is_recursive_alias() {
            return Ok(ty.name.clone());
        }
        self.render(api, ty, stack)
    }

    fn render(&self, api: &ApiModel, ty: &Type, stack: &mut RenderStack) -> Result<String> {
        let rendered = match &ty.kind {
            TypeKind::Intrinsic { intrinsic } => self.profile.intrinsic(*intrinsic)?.to_string(),
            TypeKind::Array { element } => self.profile.wrap_array(&self.type_ref(api, element, stack)?),
            TypeKind::DelimArray { element } => {
                self.profile.wrap_delim_array(&self.type_ref(api, element, stack)?)
            }
            TypeKind::Hash { element } => self.profile.wrap_map(&self.type_ref(api, element, stack)?),
            TypeKind::Enum { .. } => ty.name.clone(),
            TypeKind::Complex { properties } => {
                if ty.origin == TypeOrigin::Anonymous && !ty.recursive && stack.enter(&ty.name) {
                    let inline = self.inline_shape(api, properties.values(), stack);
                    stack.leave();
                    inline?
                } else {
                    Self::interface_name(&ty.name)
                }
            }
        };
        Ok(rendered)
    }

    fn inline_shape<'a>(
        &self,
        api: &ApiModel,
        properties: impl Iterator<Item = &'a Property>,
        stack: &mut RenderStack,
    ) -> Result<String> {
        let mut members = Vec::new();
        for prop in properties {
            members.push(format!(
                "{}{}: {}",
                Self::member_name(&prop.json_name),
                if prop.required { "" } else { "?" },
                self.property_type(api, prop, stack)?
            ));
        }
        if members.is_empty() {
            return Ok("{}".to_string());
        }
        Ok(format!("{{ {} }}", members.join("; ")))
    }

    fn property_type(&self, api: &ApiModel, prop: &Property, stack: &mut RenderStack) -> Result<String> {
        let ty = self.type_ref(api, &prop.type_name, stack)?;
        Ok(if prop.nullable { format!("{} | null", ty) } else { ty })
    }

    /// Property names that are not plain identifiers are quoted
    fn member_name(name: &str) -> String {
        let plain = name.chars().next().map_or(false, |c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if plain {
            name.to_string()
        } else {
            string_literal(name, '\'')
        }
    }

    fn param_name(&self, name: &str) -> String {
        let name = safe_name(name);
        match name.chars().next() {
            Some(c) if c.is_ascii_digit() => format!("_{}", name),
            None => "_".to_string(),
            _ => self.profile.escape_keyword(&name),
        }
    }

    fn declare_param(&self, api: &ApiModel, param: &Parameter, indent: &str) -> Result<String> {
        let type_name = if param.is_body() {
            body_type_name(api, &param.type_name)
        } else {
            &param.type_name
        };
        let ty = self.type_ref(api, type_name, &mut RenderStack::new())?;
        let marker = if param.required { "" } else { "?" };
        Ok(format!("{}{}{}: {},", indent, self.param_name(&param.name), marker, ty))
    }

    fn enum_member(value: &EnumValue) -> String {
        match value {
            EnumValue::Number(n) => {
                format!("value_{} = {}", n.to_string().replace(['-', '.'], "_"), n)
            }
            EnumValue::Text(s) => {
                let member = safe_name(s);
                let member = match member.chars().next() {
                    Some(c) if c.is_ascii_digit() => format!("_{}", member),
                    None => "_".to_string(),
                    _ => member,
                };
                format!("{} = {}", member, string_literal(s, '\''))
            }
        }
    }

    fn doc(&self, text: &str, indent: &str) -> String {
        comment_block(text, indent, "/**", " * ", " */")
    }

    /// Error union of a method, from its declared error responses
    fn error_types(&self, api: &ApiModel, method: &dyn MethodContract) -> Result<String> {
        let mut seen = Vec::new();
        for response in method.responses().iter().filter(|r| r.status_code >= 400) {
            let rendered = self.type_ref(api, &response.type_name, &mut RenderStack::new())?;
            if !seen.contains(&rendered) {
                seen.push(rendered);
            }
        }
        if seen.is_empty() {
            return Ok("unknown".to_string());
        }
        Ok(seen.join(" | "))
    }
}

impl CodeGenerator for TypeScriptGenerator {
    fn profile(&self) -> &RenderProfile {
        &self.profile
    }

    fn inlines_anonymous(&self) -> bool {
        true
    }

    fn declare_type(&self, api: &ApiModel, ty: &Type, comment: bool) -> Result<String> {
        let bump = self.profile.indent(1);
        let mut out = String::new();
        if comment {
            out.push_str(&self.doc(&ty.description, ""));
        }
        match &ty.kind {
            TypeKind::Complex { properties } => {
                out.push_str(&format!("export interface {} {{\n", Self::interface_name(&ty.name)));
                let mut stack = RenderStack::new();
                stack.enter(&ty.name);
                for prop in properties.values() {
                    if comment {
                        out.push_str(&self.doc(&prop.description, &bump));
                    }
                    out.push_str(&format!(
                        "{}{}{}: {}\n",
                        bump,
                        Self::member_name(&prop.json_name),
                        if prop.required { "" } else { "?" },
                        self.property_type(api, prop, &mut stack)?
                    ));
                }
                out.push_str("}\n");
            }
            TypeKind::Enum { values, .. } => {
                out.push_str(&format!("export enum {} {{\n", ty.name));
                for value in values {
                    out.push_str(&format!("{}{},\n", bump, Self::enum_member(value)));
                }
                out.push_str("}\n");
            }
            TypeKind::Intrinsic { .. }
            | TypeKind::Array { .. }
            | TypeKind::DelimArray { .. }
            | TypeKind::Hash { .. } => {
                let target = self.render(api, ty, &mut RenderStack::new())?;
                out.push_str(&format!("export type {} = {}\n", declared_name(api, ty), target));
            }
        }
        Ok(out)
    }

    fn declare_method(&self, api: &ApiModel, method: &dyn MethodContract, comment: bool) -> Result<String> {
        let indent = self.profile.indent(1);
        let bump = self.profile.indent(2);
        let returns = self.type_ref(api, method.return_type(), &mut RenderStack::new())?;
        let errors = self.error_types(api, method)?;

        let mut out = String::new();
        if comment {
            out.push_str(&self.doc(&method_header(method), &indent));
        }
        if method.deprecated() && !comment {
            out.push_str(&format!("{}/** @deprecated */\n", indent));
        }
        out.push_str(&format!("{}{}(\n", indent, self.param_name(method.name())));
        for param in method.all_params() {
            out.push_str(&self.declare_param(api, param, &bump)?);
            out.push('\n');
        }
        out.push_str(&format!("{}options?: Partial<ITransportSettings>\n", bump));
        out.push_str(&format!("{}): Promise<SDKResponse<{}, {}>>\n", indent, returns, errors));
        Ok(out)
    }

    fn models_prologue(&self, api: &ApiModel) -> String {
        format!(
            "// NOTE: generated by sdkgen, do not edit\n\
             // {} API {} models\n\n\
             import type {{ DelimArray, IDictionary, Password, Url }} from './runtime'\n\n",
            api.title(),
            api.version()
        )
    }

    fn methods_prologue(&self, api: &ApiModel) -> String {
        format!(
            "// NOTE: generated by sdkgen, do not edit\n\
             // {} API {} methods\n\n\
             import type {{ DelimArray, IDictionary, ITransportSettings, Password, SDKResponse, Url }} from './runtime'\n\n\
             export interface IApiMethods {{\n",
            api.title(),
            api.version()
        )
    }

    fn methods_epilogue(&self, _api: &ApiModel) -> String {
        "}\n".to_string()
    }
}
