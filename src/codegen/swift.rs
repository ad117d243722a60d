//! Swift emitter
//!
//! Recursive types are reference types (`class`); every other complex
//! type is a `struct`. Method signatures belong to a protocol, which
//! cannot carry default argument values.

use crate::error::Result;
use crate::model::names::safe_name;
use crate::model::{ApiModel, EnumValue, MethodContract, Parameter, Property, Type, TypeKind};

use super::config::RenderProfile;
use super::{body_type_name, comment_block, declared_name, method_header, string_literal, CodeGenerator};

pub struct SwiftGenerator {
    profile: RenderProfile,
}

impl SwiftGenerator {
    pub fn new(profile: RenderProfile) -> Self {
        Self { profile }
    }

    fn type_ref(&self, api: &ApiModel, name: &str) -> Result<String> {
        let ty = api.require_type(name)?;
        if ty.is_recursive_alias() {
            return Ok(ty.name.clone());
        }
        self.render(api, ty)
    }

    fn render(&self, api: &ApiModel, ty: &Type) -> Result<String> {
        let rendered = match &ty.kind {
            TypeKind::Intrinsic { intrinsic } => self.profile.intrinsic(*intrinsic)?.to_string(),
            TypeKind::Array { element } => self.profile.wrap_array(&self.type_ref(api, element)?),
            TypeKind::DelimArray { element } => self.profile.wrap_delim_array(&self.type_ref(api, element)?),
            TypeKind::Hash { element } => self.profile.wrap_map(&self.type_ref(api, element)?),
            TypeKind::Complex { .. } | TypeKind::Enum { .. } => ty.name.clone(),
        };
        Ok(rendered)
    }

    fn identifier(&self, name: &str) -> String {
        let name = safe_name(name);
        match name.chars().next() {
            Some(c) if c.is_ascii_digit() => format!("_{}", name),
            None => "_".to_string(),
            _ => self.profile.escape_keyword(&name),
        }
    }

    fn property_type(&self, api: &ApiModel, prop: &Property) -> Result<String> {
        let ty = self.type_ref(api, &prop.type_name)?;
        if prop.required && !prop.nullable {
            Ok(ty)
        } else {
            Ok(self.profile.wrap_optional(&ty))
        }
    }

    fn declare_param(&self, api: &ApiModel, param: &Parameter, indent: &str) -> Result<String> {
        let type_name = if param.is_body() {
            body_type_name(api, &param.type_name)
        } else {
            &param.type_name
        };
        let ty = self.type_ref(api, type_name)?;
        let ty = if param.required { ty } else { self.profile.wrap_optional(&ty) };
        Ok(format!("{}{}: {}", indent, self.identifier(&param.name), ty))
    }

    fn doc(&self, text: &str, indent: &str) -> String {
        comment_block(text, indent, "/**", " * ", " */")
    }

    fn declare_complex(&self, api: &ApiModel, ty: &Type, comment: bool) -> Result<String> {
        let bump = self.profile.indent(1);
        let bump2 = self.profile.indent(2);
        let keyword = if ty.recursive { "class" } else { "struct" };
        let mut out = format!("public {} {}: SDKModel {{\n", keyword, ty.name);

        let renamed: Vec<&Property> = ty
            .properties()
            .filter(|p| self.identifier(&p.name) != p.json_name)
            .collect();
        if !renamed.is_empty() {
            out.push_str(&format!("\n{}private enum CodingKeys : String, CodingKey {{\n", bump));
            for prop in ty.properties() {
                let ident = self.identifier(&prop.name);
                if ident == prop.json_name {
                    out.push_str(&format!("{}case {}\n", bump2, ident));
                } else {
                    out.push_str(&format!(
                        "{}case {} = {}\n",
                        bump2,
                        ident,
                        string_literal(&prop.json_name, '"')
                    ));
                }
            }
            out.push_str(&format!("{}}}\n", bump));
        }

        let mut args = Vec::new();
        let mut assigns = Vec::new();
        for prop in ty.properties() {
            let ident = self.identifier(&prop.name);
            let prop_type = self.property_type(api, prop)?;
            out.push('\n');
            if comment {
                out.push_str(&self.doc(&prop.description, &bump));
            }
            out.push_str(&format!("{}public var {}: {}\n", bump, ident, prop_type));
            if prop.required && !prop.nullable {
                args.push(format!("{}: {}", ident, prop_type));
            } else {
                args.push(format!("{}: {} = nil", ident, prop_type));
            }
            assigns.push(format!("{}self.{} = {}", bump2, ident, ident));
        }

        out.push_str(&format!("\n{}public init({}) {{\n", bump, args.join(", ")));
        for assign in assigns {
            out.push_str(&assign);
            out.push('\n');
        }
        out.push_str(&format!("{}}}\n\n}}\n", bump));
        Ok(out)
    }

    fn declare_enum(&self, ty: &Type, values: &[EnumValue]) -> String {
        let bump = self.profile.indent(1);
        let numeric = !values.is_empty() && values.iter().all(EnumValue::is_numeric);
        let raw = if numeric { "Int64" } else { "String" };
        let mut out = format!("public enum {}: {}, Codable {{\n", ty.name, raw);
        for value in values {
            let text = value.to_string();
            let line = match value {
                EnumValue::Number(_) if numeric => {
                    format!("case value_{} = {}", text.replace(['-', '.'], "_"), text)
                }
                _ => format!("case {} = {}", self.identifier(&text), string_literal(&text, '"')),
            };
            out.push_str(&format!("{}{}\n", bump, line));
        }
        out.push_str("}\n");
        out
    }
}

impl CodeGenerator for SwiftGenerator {
    fn profile(&self) -> &RenderProfile {
        &self.profile
    }

    fn declare_type(&self, api: &ApiModel, ty: &Type, comment: bool) -> Result<String> {
        let mut out = String::new();
        if comment {
            out.push_str(&self.doc(&ty.description, ""));
        }
        match &ty.kind {
            TypeKind::Complex { .. } => out.push_str(&self.declare_complex(api, ty, comment)?),
            TypeKind::Enum { values, .. } => out.push_str(&self.declare_enum(ty, values)),
            TypeKind::Intrinsic { .. }
            | TypeKind::Array { .. }
            | TypeKind::DelimArray { .. }
            | TypeKind::Hash { .. } => {
                let target = self.render(api, ty)?;
                out.push_str(&format!("public typealias {} = {}\n", declared_name(api, ty), target));
            }
        }
        Ok(out)
    }

    fn declare_method(&self, api: &ApiModel, method: &dyn MethodContract, comment: bool) -> Result<String> {
        let indent = self.profile.indent(1);
        let bump = self.profile.indent(2);
        let returns = self.type_ref(api, method.return_type())?;

        let mut out = String::new();
        if comment {
            out.push_str(&self.doc(&method_header(method), &indent));
        }
        if method.deprecated() {
            out.push_str(&format!("{}@available(*, deprecated)\n", indent));
        }
        let mut params = Vec::new();
        for param in method.all_params() {
            params.push(self.declare_param(api, param, &bump)?);
        }
        let name = self.identifier(method.name());
        if params.is_empty() {
            out.push_str(&format!("{}func {}() -> SDKResponse<{}, SDKError>\n", indent, name, returns));
        } else {
            out.push_str(&format!("{}func {}(\n", indent, name));
            out.push_str(&params.join(",\n"));
            out.push_str(&format!("\n{}) -> SDKResponse<{}, SDKError>\n", indent, returns));
        }
        Ok(out)
    }

    fn models_prologue(&self, api: &ApiModel) -> String {
        format!(
            "// NOTE: generated by sdkgen, do not edit\n\
             // {} API {} models\n\n\
             import Foundation\n\n",
            api.title(),
            api.version()
        )
    }

    fn methods_prologue(&self, api: &ApiModel) -> String {
        format!(
            "// NOTE: generated by sdkgen, do not edit\n\
             // {} API {} methods\n\n\
             import Foundation\n\n\
             public protocol ApiMethods {{\n\n",
            api.title(),
            api.version()
        )
    }

    fn methods_epilogue(&self, _api: &ApiModel) -> String {
        "}\n".to_string()
    }
}
