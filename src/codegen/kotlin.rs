//! Kotlin emitter

use crate::error::Result;
use crate::model::names::safe_name;
use crate::model::{ApiModel, EnumValue, MethodContract, Parameter, Property, Type, TypeKind};

use super::config::RenderProfile;
use super::{body_type_name, comment_block, declared_name, method_header, CodeGenerator};

pub struct KotlinGenerator {
    profile: RenderProfile,
}

impl KotlinGenerator {
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

    fn declare_property(&self, api: &ApiModel, prop: &Property, indent: &str) -> Result<String> {
        let ty = self.type_ref(api, &prop.type_name)?;
        let name = self.identifier(&prop.name);
        if prop.required && !prop.nullable {
            Ok(format!("{}var {}: {}", indent, name, ty))
        } else {
            Ok(format!("{}var {}: {} = null", indent, name, self.profile.wrap_optional(&ty)))
        }
    }

    fn declare_param(&self, api: &ApiModel, param: &Parameter, indent: &str) -> Result<String> {
        let type_name = if param.is_body() {
            body_type_name(api, &param.type_name)
        } else {
            &param.type_name
        };
        let ty = self.type_ref(api, type_name)?;
        let name = self.identifier(&param.name);
        if param.required {
            Ok(format!("{}{}: {}", indent, name, ty))
        } else {
            Ok(format!("{}{}: {} = null", indent, name, self.profile.wrap_optional(&ty)))
        }
    }

    fn enum_member(&self, value: &EnumValue) -> String {
        match value {
            EnumValue::Number(n) => format!("value_{}", n.to_string().replace(['-', '.'], "_")),
            EnumValue::Text(s) => self.identifier(s),
        }
    }

    fn doc(&self, text: &str, indent: &str) -> String {
        comment_block(text, indent, "/**", " * ", " */")
    }

    /// Class doc with one `@property` line per described property
    fn class_doc(&self, ty: &Type) -> String {
        let mut lines = Vec::new();
        let description = ty.description.trim();
        if !description.is_empty() {
            lines.push(description.to_string());
        }
        for prop in ty.properties() {
            let text = prop.description.trim();
            if !text.is_empty() {
                lines.push(format!("@property {} {}", self.identifier(&prop.name), text));
            }
        }
        self.doc(&lines.join("\n"), "")
    }
}

impl CodeGenerator for KotlinGenerator {
    fn profile(&self) -> &RenderProfile {
        &self.profile
    }

    fn declare_type(&self, api: &ApiModel, ty: &Type, comment: bool) -> Result<String> {
        let bump = self.profile.indent(1);
        let mut out = String::new();
        match &ty.kind {
            TypeKind::Complex { properties } => {
                if comment {
                    out.push_str(&self.class_doc(ty));
                }
                if properties.is_empty() {
                    out.push_str(&format!("class {} : Serializable\n", ty.name));
                    return Ok(out);
                }
                let mut lines = Vec::with_capacity(properties.len());
                for prop in properties.values() {
                    lines.push(self.declare_property(api, prop, &bump)?);
                }
                out.push_str(&format!("data class {} (\n", ty.name));
                out.push_str(&lines.join(",\n"));
                out.push_str("\n) : Serializable\n");
            }
            TypeKind::Enum { values, .. } => {
                if comment {
                    out.push_str(&self.doc(&ty.description, ""));
                }
                let members: Vec<String> = values
                    .iter()
                    .map(|v| format!("{}{}", bump, self.enum_member(v)))
                    .collect();
                out.push_str(&format!("enum class {} : Serializable {{\n", ty.name));
                out.push_str(&members.join(",\n"));
                out.push_str("\n}\n");
            }
            TypeKind::Intrinsic { .. }
            | TypeKind::Array { .. }
            | TypeKind::DelimArray { .. }
            | TypeKind::Hash { .. } => {
                if comment {
                    out.push_str(&self.doc(&ty.description, ""));
                }
                let target = self.render(api, ty)?;
                out.push_str(&format!("typealias {} = {}\n", declared_name(api, ty), target));
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
            out.push_str(&format!("{}@Deprecated(\"Deprecated method\")\n", indent));
        }
        let mut params = Vec::new();
        for param in method.all_params() {
            params.push(self.declare_param(api, param, &bump)?);
        }
        if params.is_empty() {
            out.push_str(&format!(
                "{}fun {}(): SDKResponse<{}>\n",
                indent,
                self.identifier(method.name()),
                returns
            ));
        } else {
            out.push_str(&format!("{}fun {}(\n", indent, self.identifier(method.name())));
            out.push_str(&params.join(",\n"));
            out.push_str(&format!("\n{}): SDKResponse<{}>\n", indent, returns));
        }
        Ok(out)
    }

    fn models_prologue(&self, api: &ApiModel) -> String {
        format!(
            "// NOTE: generated by sdkgen, do not edit\n\
             // {} API {} models\n\n\
             package com.sdkgen.sdk\n\n\
             import com.sdkgen.rtl.*\n\
             import java.io.Serializable\n\
             import java.util.*\n\n",
            api.title(),
            api.version()
        )
    }

    fn methods_prologue(&self, api: &ApiModel) -> String {
        format!(
            "// NOTE: generated by sdkgen, do not edit\n\
             // {} API {} methods\n\n\
             package com.sdkgen.sdk\n\n\
             import com.sdkgen.rtl.*\n\
             import java.util.*\n\n\
             interface ApiMethods {{\n\n",
            api.title(),
            api.version()
        )
    }

    fn methods_epilogue(&self, _api: &ApiModel) -> String {
        "}\n".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> ApiModel {
        ApiModel::from_json(
            r##"{
                "openapi": "3.0.0",
                "info": { "title": "Demo", "version": "4.0" },
                "paths": {
                    "/boards/{board_id}": { "delete": {
                        "operationId": "delete_board",
                        "deprecated": true,
                        "parameters": [
                            { "name": "board_id", "in": "path", "required": true,
                              "schema": { "type": "integer", "format": "int64" } }
                        ],
                        "responses": { "204": { "description": "Deleted" } }
                    } },
                    "/boards": { "get": {
                        "operationId": "all_boards",
                        "responses": { "200": { "description": "Boards",
                            "content": { "application/json": { "schema": {
                                "type": "array", "items": { "$ref": "#/components/schemas/Board" } } } } } }
                    } }
                },
                "components": { "schemas": {
                    "Board": { "type": "object", "required": ["id"],
                        "properties": {
                            "id": { "type": "integer", "format": "int64", "description": "Unique Id" },
                            "object": { "type": "string" },
                            "can": { "type": "object", "additionalProperties": { "type": "boolean" } },
                            "state": { "type": "string", "enum": ["open", "closed"] }
                        } },
                    "Empty": { "type": "object", "properties": {} }
                } }
            }"##,
        )
        .unwrap()
    }

    #[test]
    fn test_data_class() {
        let api = api();
        let gen = KotlinGenerator::new(RenderProfile::kotlin());
        let text = gen.declare_type(&api, api.type_by_name("Board").unwrap(), true).unwrap();
        assert!(text.starts_with("/**\n * @property id Unique Id\n */\n"));
        assert!(text.contains(
            "data class Board (\n    var id: Long,\n    var `object`: String? = null,\n    var can: Map<String,Boolean>? = null,\n    var state: State? = null\n) : Serializable\n"
        ));
    }

    #[test]
    fn test_empty_class_and_enum() {
        let api = api();
        let gen = KotlinGenerator::new(RenderProfile::kotlin());
        let empty = gen.declare_type(&api, api.type_by_name("Empty").unwrap(), false).unwrap();
        assert_eq!(empty, "class Empty : Serializable\n");
        let state = gen.declare_type(&api, api.type_by_name("State").unwrap(), false).unwrap();
        assert_eq!(state, "enum class State : Serializable {\n    open,\n    closed\n}\n");
    }

    #[test]
    fn test_method_signatures() {
        let api = api();
        let gen = KotlinGenerator::new(RenderProfile::kotlin());
        let delete = gen.declare_method(&api, api.method("delete_board").unwrap(), false).unwrap();
        assert_eq!(
            delete,
            "    @Deprecated(\"Deprecated method\")\n    fun delete_board(\n        board_id: Long\n    ): SDKResponse<Void>\n"
        );
        let all = gen.declare_method(&api, api.method("all_boards").unwrap(), false).unwrap();
        assert_eq!(all, "    fun all_boards(): SDKResponse<Array<Board>>\n");
    }
}
