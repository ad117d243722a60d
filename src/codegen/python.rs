//! Python emitter
//!
//! Models are `attrs` classes deriving from `model.Model`; enums derive
//! from `enum.Enum`. Methods are stubs on an `ApiMethods` class.

use crate::error::Result;
use crate::model::names::safe_name;
use crate::model::{ApiModel, EnumValue, MethodContract, Parameter, Property, Type, TypeKind};

use super::config::RenderProfile;
use super::{body_type_name, comment_block, declared_name, method_header, string_literal, CodeGenerator};

/// Where a type reference is written
#[derive(Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Inside the models module: custom types are string forward references
    Models,
    /// Inside the methods module: custom types are qualified by `models.`
    Methods,
}

pub struct PythonGenerator {
    profile: RenderProfile,
}

impl PythonGenerator {
    pub fn new(profile: RenderProfile) -> Self {
        Self { profile }
    }

    fn type_ref(&self, api: &ApiModel, name: &str, scope: Scope) -> Result<String> {
        let ty = api.require_type(name)?;
        if ty.is_recursive_alias() {
            return Ok(Self::named(ty, scope));
        }
        self.render(api, ty, scope)
    }

    fn named(ty: &Type, scope: Scope) -> String {
        match scope {
            Scope::Models => string_literal(&ty.name, '"'),
            Scope::Methods => format!("models.{}", ty.name),
        }
    }

    /// One level of `ty`, with nested types rendered as references
    fn render(&self, api: &ApiModel, ty: &Type, scope: Scope) -> Result<String> {
        let rendered = match &ty.kind {
            TypeKind::Intrinsic { intrinsic } => self.profile.intrinsic(*intrinsic)?.to_string(),
            TypeKind::Array { element } => self.profile.wrap_array(&self.type_ref(api, element, scope)?),
            TypeKind::DelimArray { element } => {
                self.profile.wrap_delim_array(&self.type_ref(api, element, scope)?)
            }
            TypeKind::Hash { element } => self.profile.wrap_map(&self.type_ref(api, element, scope)?),
            TypeKind::Complex { .. } | TypeKind::Enum { .. } => Self::named(ty, scope),
        };
        Ok(rendered)
    }

    fn member_name(&self, name: &str) -> String {
        let name = safe_name(name);
        let name = match name.chars().next() {
            Some(c) if c.is_ascii_digit() => format!("_{}", name),
            None => "_".to_string(),
            _ => name,
        };
        self.profile.escape_keyword(&name)
    }

    fn declare_property(&self, api: &ApiModel, prop: &Property, indent: &str) -> Result<String> {
        let ty = self.type_ref(api, &prop.type_name, Scope::Models)?;
        let name = self.member_name(&prop.name);
        if prop.required {
            Ok(format!("{}{}: {}", indent, name, ty))
        } else {
            Ok(format!("{}{}: {} = None", indent, name, self.profile.wrap_optional(&ty)))
        }
    }

    fn declare_param(&self, api: &ApiModel, param: &Parameter, indent: &str) -> Result<String> {
        let type_name = if param.is_body() {
            body_type_name(api, &param.type_name)
        } else {
            &param.type_name
        };
        let ty = self.type_ref(api, type_name, Scope::Methods)?;
        let name = self.member_name(&param.name);
        if param.required {
            Ok(format!("{}{}: {},", indent, name, ty))
        } else {
            Ok(format!("{}{}: {} = None,", indent, name, self.profile.wrap_optional(&ty)))
        }
    }

    fn enum_member(&self, value: &EnumValue) -> String {
        let text = value.to_string();
        let member = match value {
            EnumValue::Number(_) => format!("value_{}", text.replace(['-', '.'], "_")),
            EnumValue::Text(_) => self.member_name(&text),
        };
        let literal = match value {
            EnumValue::Number(_) => text,
            EnumValue::Text(s) => string_literal(s, '"'),
        };
        format!("{} = {}", member, literal)
    }

    fn docstring(&self, text: &str, indent: &str) -> String {
        comment_block(text, indent, "\"\"\"", "", "\"\"\"")
    }
}

impl CodeGenerator for PythonGenerator {
    fn profile(&self) -> &RenderProfile {
        &self.profile
    }

    fn declare_type(&self, api: &ApiModel, ty: &Type, comment: bool) -> Result<String> {
        let bump = self.profile.indent(1);
        let mut out = String::new();
        match &ty.kind {
            TypeKind::Complex { properties } => {
                out.push_str("@attr.s(auto_attribs=True, init=False)\n");
                out.push_str(&format!("class {}(model.Model):\n", ty.name));
                if comment {
                    let mut doc = ty.description.trim().to_string();
                    let described: Vec<&Property> = properties
                        .values()
                        .filter(|p| !p.description.trim().is_empty())
                        .collect();
                    if !described.is_empty() {
                        if !doc.is_empty() {
                            doc.push_str("\n\n");
                        }
                        doc.push_str("Attributes:");
                        for prop in described {
                            doc.push_str(&format!(
                                "\n{}{}: {}",
                                bump,
                                self.member_name(&prop.name),
                                prop.description.trim()
                            ));
                        }
                    }
                    let block = self.docstring(&doc, &bump);
                    if !block.is_empty() {
                        out.push_str(&block);
                        out.push('\n');
                    }
                }
                // attrs requires mandatory attributes before defaulted ones
                let (required, optional): (Vec<&Property>, Vec<&Property>) =
                    properties.values().partition(|p| p.required);
                let mut lines = Vec::with_capacity(properties.len());
                for prop in required.into_iter().chain(optional) {
                    lines.push(self.declare_property(api, prop, &bump)?);
                }
                if lines.is_empty() {
                    lines.push(format!("{}pass", bump));
                }
                out.push_str(&lines.join("\n"));
                out.push('\n');
            }
            TypeKind::Enum { values, .. } => {
                out.push_str(&format!("class {}(enum.Enum):\n", ty.name));
                if comment {
                    let block = self.docstring(&ty.description, &bump);
                    if !block.is_empty() {
                        out.push_str(&block);
                        out.push('\n');
                    }
                }
                for value in values {
                    out.push_str(&format!("{}{}\n", bump, self.enum_member(value)));
                }
                if values.is_empty() {
                    out.push_str(&format!("{}pass\n", bump));
                }
            }
            TypeKind::Intrinsic { .. }
            | TypeKind::Array { .. }
            | TypeKind::DelimArray { .. }
            | TypeKind::Hash { .. } => {
                if comment {
                    out.push_str(&comment_block(&ty.description, "", "", "# ", ""));
                }
                let target = self.render(api, ty, Scope::Models)?;
                out.push_str(&format!("{} = {}\n", declared_name(api, ty), target));
            }
        }
        Ok(out)
    }

    fn declare_method(&self, api: &ApiModel, method: &dyn MethodContract, comment: bool) -> Result<String> {
        let indent = self.profile.indent(1);
        let bump = self.profile.indent(2);
        let returns = self.type_ref(api, method.return_type(), Scope::Methods)?;

        let mut out = format!("{}def {}(\n{}self,\n", indent, self.member_name(method.name()), bump);
        for param in method.all_params() {
            out.push_str(&self.declare_param(api, param, &bump)?);
            out.push('\n');
        }
        out.push_str(&format!("{}) -> {}:\n", indent, returns));
        if comment {
            out.push_str(&self.docstring(&method_header(method), &bump));
        }
        out.push_str(&format!("{}...\n", bump));
        Ok(out)
    }

    fn models_prologue(&self, api: &ApiModel) -> String {
        format!(
            "# NOTE: generated by sdkgen, do not edit\n\
             # {} API {} models\n\n\
             import datetime\n\
             import enum\n\
             from typing import Any, MutableMapping, Optional, Sequence\n\n\
             import attr\n\n\
             from . import model\n\
             from .model import DelimSequence\n\n\n",
            api.title(),
            api.version()
        )
    }

    fn methods_prologue(&self, api: &ApiModel) -> String {
        format!(
            "# NOTE: generated by sdkgen, do not edit\n\
             # {} API {} methods\n\n\
             import datetime\n\
             from typing import Any, MutableMapping, Optional, Sequence\n\n\
             from . import models\n\
             from .model import DelimSequence\n\n\n\
             class ApiMethods:\n",
            api.title(),
            api.version()
        )
    }
}
