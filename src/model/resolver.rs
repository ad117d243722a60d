//! Type resolution: from an [`IntermediateSpec`] to an [`ApiModel`]
//!
//! Runs in passes over the document:
//! 1. register a placeholder for every named schema
//! 2. fill placeholders, resolving `$ref`s by name and deduplicating
//!    anonymous objects and enums by structural signature
//! 3. build methods, parameters and responses
//! 4. derive read-only flags, writeable types, cycle groups and tags
//!
//! References only ever look up names registered in pass 1, so cyclic
//! schemas never cause recursion.

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, warn};

use super::analysis::{base_type, TypeGraph};
use super::method::{HttpMethod, Method, MethodResponse, ParamLocation, Parameter, Tag};
use super::names::{safe_name, title_case, NameRegistry};
use super::types::{EnumValue, Intrinsic, Property, Type, TypeKind, TypeOrigin};
use super::ApiModel;
use crate::error::{Result, SpecError};
use crate::spec::{
    IntermediateSpec, Operation, ParameterObject, RefOr, RequestBody, Response, Schema,
};

const SCHEMA_PREFIX: &str = "#/components/schemas/";
const PARAMETER_PREFIX: &str = "#/components/parameters/";
const REQUEST_BODY_PREFIX: &str = "#/components/requestBodies/";
const RESPONSE_PREFIX: &str = "#/components/responses/";
const DEFAULT_TAG: &str = "default";
const JSON_MEDIA: &str = "application/json";

/// Parameter styles that serialize arrays as one delimited value
const DELIMITED_STYLES: [&str; 3] = ["simple", "pipeDelimited", "spaceDelimited"];

/// Resolve a loaded specification into an immutable model
pub fn resolve(spec: &IntermediateSpec) -> Result<ApiModel> {
    TypeResolver::new(spec).run()
}

/// Naming context for inline schemas
#[derive(Clone, Copy)]
struct Hint<'a> {
    owner: &'a str,
    member: &'a str,
    style: Option<&'a str>,
}

impl<'a> Hint<'a> {
    fn new(owner: &'a str, member: &'a str) -> Self {
        Self {
            owner,
            member,
            style: None,
        }
    }
}

#[derive(Clone, Copy)]
enum CollectionKind {
    Array,
    DelimArray,
    Hash,
}

struct TypeResolver<'s> {
    spec: &'s IntermediateSpec,
    types: BTreeMap<String, Type>,
    names: NameRegistry,
    /// `$ref` pointer -> canonical type name
    refs: HashMap<String, String>,
    /// structural signature -> anonymous complex type name
    objects: HashMap<String, String>,
    /// element and values -> enum type name
    enums: HashMap<String, String>,
}

impl<'s> TypeResolver<'s> {
    fn new(spec: &'s IntermediateSpec) -> Self {
        let mut types = BTreeMap::new();
        let mut names = NameRegistry::new();
        for intrinsic in Intrinsic::ALL {
            names.reserve(intrinsic.name());
            types.insert(intrinsic.name().to_string(), Type::intrinsic(intrinsic));
        }
        Self {
            spec,
            types,
            names,
            refs: HashMap::new(),
            objects: HashMap::new(),
            enums: HashMap::new(),
        }
    }

    fn run(mut self) -> Result<ApiModel> {
        let spec = self.spec;
        self.register_schemas()?;
        self.fill_schemas()?;
        let (methods, order) = self.build_methods()?;

        self.compute_read_only();
        let writeable = self.register_writeable();

        let cycle_groups = TypeGraph::build(&self.types).cycle_groups();
        for name in cycle_groups.iter().flatten() {
            if let Some(ty) = self.types.get_mut(name) {
                ty.recursive = true;
            }
        }

        self.validate(&methods)?;
        let tags = self.build_tags(&methods, &order);

        info!(
            types = self.types.len(),
            methods = methods.len(),
            tags = tags.len(),
            cycles = cycle_groups.len(),
            "resolved api model"
        );

        let info = &spec.info;
        Ok(ApiModel {
            title: info.title.clone(),
            version: info.version.clone(),
            description: info.description.clone().unwrap_or_default(),
            types: self.types,
            methods,
            tags,
            writeable,
            cycle_groups,
            fixes: spec.fixes.clone(),
        })
    }

    // =========================================================================
    // Named Schemas
    // =========================================================================

    fn register_schemas(&mut self) -> Result<()> {
        let spec = self.spec;
        for json_name in spec.components.schemas.keys() {
            let name = self.names.unique(&safe_name(json_name));
            let mut placeholder = Type::new(
                name.clone(),
                TypeKind::Complex {
                    properties: IndexMap::new(),
                },
                TypeOrigin::Schema,
            );
            placeholder.json_name = json_name.clone();
            self.types.insert(name.clone(), placeholder);
            self.refs.insert(format!("{}{}", SCHEMA_PREFIX, json_name), name);
        }

        // a schema that is only a `$ref` becomes another name for its target
        let mut aliases = Vec::new();
        for (json_name, schema) in &spec.components.schemas {
            if let RefOr::Ref { reference } = schema {
                aliases.push((format!("{}{}", SCHEMA_PREFIX, json_name), reference.clone()));
            }
        }
        for (pointer, target) in &aliases {
            let mut seen = BTreeSet::new();
            let mut current = target.clone();
            while let Some((_, next)) = aliases.iter().find(|(p, _)| *p == current) {
                if !seen.insert(current.clone()) {
                    return Err(SpecError::format(format!("schema alias cycle through {}", pointer)));
                }
                current = next.clone();
            }
            let resolved = self.resolve_ref(&current)?;
            if let Some(placeholder) = self.refs.insert(pointer.clone(), resolved) {
                self.types.remove(&placeholder);
            }
        }

        debug!(schemas = spec.components.schemas.len(), "registered named schemas");
        Ok(())
    }

    fn fill_schemas(&mut self) -> Result<()> {
        let spec = self.spec;
        for (json_name, schema) in &spec.components.schemas {
            let RefOr::Item(schema) = schema else {
                continue;
            };
            let name = self.resolve_ref(&format!("{}{}", SCHEMA_PREFIX, json_name))?;
            let kind = self.classify_named(&name, schema)?;
            if let Some(ty) = self.types.get_mut(&name) {
                ty.kind = kind;
                apply_metadata(ty, schema);
            }
        }
        Ok(())
    }

    fn classify_named(&mut self, name: &str, schema: &Schema) -> Result<TypeKind> {
        let hint = Hint::new(name, "item");
        if let Some(items) = &schema.items {
            let element = self.resolve(items, hint)?;
            return Ok(TypeKind::Array { element });
        }
        if let Some(values) = schema.map_values() {
            let element = self.resolve(values, hint)?;
            return Ok(TypeKind::Hash { element });
        }
        if let Some(values) = &schema.enum_values {
            let element = intrinsic_for(schema)?;
            let values = enum_values(values);
            self.enums
                .entry(enum_signature(element, &values))
                .or_insert_with(|| name.to_string());
            return Ok(TypeKind::Enum {
                element: element.name().to_string(),
                values,
            });
        }
        if schema.is_object() {
            let properties = self.build_properties(name, schema)?;
            return Ok(TypeKind::Complex { properties });
        }
        Ok(TypeKind::Intrinsic {
            intrinsic: intrinsic_for(schema)?,
        })
    }

    fn build_properties(&mut self, owner: &str, schema: &Schema) -> Result<IndexMap<String, Property>> {
        let mut properties = IndexMap::new();
        for (json_name, prop_schema) in &schema.properties {
            let name = safe_name(json_name);
            let type_name = self.resolve(prop_schema, Hint::new(owner, &name))?;
            let inline = match prop_schema {
                RefOr::Item(s) => Some(s),
                RefOr::Ref { .. } => None,
            };
            let property = Property {
                name: name.clone(),
                json_name: json_name.clone(),
                owner: owner.to_string(),
                type_name,
                description: inline
                    .and_then(|s| s.description.clone())
                    .unwrap_or_default(),
                required: schema.required.iter().any(|r| r == json_name),
                read_only: inline.map_or(false, |s| s.read_only),
                write_only: inline.map_or(false, |s| s.write_only),
                nullable: inline.map_or(false, |s| s.nullable),
                deprecated: inline.map_or(false, |s| s.deprecated),
                status: inline.and_then(|s| s.status.clone()).unwrap_or_default(),
            };
            properties.insert(name, property);
        }
        Ok(properties)
    }

    // =========================================================================
    // Inline Schemas
    // =========================================================================

    fn resolve(&mut self, schema: &RefOr<Schema>, hint: Hint<'_>) -> Result<String> {
        match schema {
            RefOr::Ref { reference } => self.resolve_ref(reference),
            RefOr::Item(schema) => self.resolve_inline(schema, hint),
        }
    }

    fn resolve_ref(&self, reference: &str) -> Result<String> {
        self.refs
            .get(reference)
            .cloned()
            .ok_or_else(|| SpecError::unresolved(reference))
    }

    fn resolve_inline(&mut self, schema: &Schema, hint: Hint<'_>) -> Result<String> {
        let is_array = schema.schema_type.as_deref() == Some("array");
        if schema.items.is_some() || is_array {
            let mut element = match &schema.items {
                Some(items) => self.resolve(items, Hint { style: None, ..hint })?,
                None => Intrinsic::Any.name().to_string(),
            };
            // enum declared on the array itself applies to its elements
            if let Some(values) = &schema.enum_values {
                let intrinsic = match &schema.items {
                    Some(items) => match &**items {
                        RefOr::Item(s) => intrinsic_for(s)?,
                        RefOr::Ref { .. } => Intrinsic::String,
                    },
                    None => Intrinsic::String,
                };
                element = self.register_enum(intrinsic, values, schema, hint);
            }
            let delimited = hint.style.map_or(false, |s| DELIMITED_STYLES.contains(&s));
            let kind = if delimited {
                CollectionKind::DelimArray
            } else {
                CollectionKind::Array
            };
            return Ok(self.collection(kind, element));
        }
        if let Some(values) = schema.map_values() {
            let element = self.resolve(values, hint)?;
            return Ok(self.collection(CollectionKind::Hash, element));
        }
        if let Some(values) = &schema.enum_values {
            let intrinsic = intrinsic_for(schema)?;
            return Ok(self.register_enum(intrinsic, values, schema, hint));
        }
        if !schema.properties.is_empty() {
            return self.register_object(schema, hint);
        }
        Ok(intrinsic_for(schema)?.name().to_string())
    }

    fn collection(&mut self, kind: CollectionKind, element: String) -> String {
        let (name, kind) = match kind {
            CollectionKind::Array => (format!("{}[]", element), TypeKind::Array { element }),
            CollectionKind::DelimArray => {
                (format!("DelimArray<{}>", element), TypeKind::DelimArray { element })
            }
            CollectionKind::Hash => (format!("Hash[{}]", element), TypeKind::Hash { element }),
        };
        if !self.types.contains_key(&name) {
            self.names.reserve(&name);
            self.types
                .insert(name.clone(), Type::new(name.clone(), kind, TypeOrigin::Collection));
        }
        name
    }

    fn register_enum(&mut self, element: Intrinsic, values: &[Value], schema: &Schema, hint: Hint<'_>) -> String {
        let values = enum_values(values);
        let signature = enum_signature(element, &values);
        if let Some(existing) = self.enums.get(&signature) {
            return existing.clone();
        }
        let base = schema
            .title
            .as_deref()
            .map(title_case)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| title_case(hint.member));
        let name = self.names.unique(if base.is_empty() { "Enum" } else { &base });
        let mut ty = Type::new(
            name.clone(),
            TypeKind::Enum {
                element: element.name().to_string(),
                values,
            },
            TypeOrigin::Anonymous,
        );
        apply_metadata(&mut ty, schema);
        debug!(name = %name, owner = hint.owner, "registered anonymous enum");
        self.enums.insert(signature, name.clone());
        self.types.insert(name.clone(), ty);
        name
    }

    fn register_object(&mut self, schema: &Schema, hint: Hint<'_>) -> Result<String> {
        let base = schema
            .title
            .as_deref()
            .map(title_case)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| title_case(&format!("{}_{}", hint.owner, hint.member)));
        let mut properties = self.build_properties(&base, schema)?;

        let mut parts: Vec<String> = properties
            .values()
            .map(|p| format!("{}:{}:{}", p.json_name, p.type_name, p.required))
            .collect();
        parts.sort();
        let signature = parts.join(",");
        if let Some(existing) = self.objects.get(&signature) {
            return Ok(existing.clone());
        }

        let name = self.names.unique(&base);
        for property in properties.values_mut() {
            property.owner = name.clone();
        }
        let mut ty = Type::new(name.clone(), TypeKind::Complex { properties }, TypeOrigin::Anonymous);
        apply_metadata(&mut ty, schema);
        debug!(name = %name, owner = hint.owner, "registered anonymous object");
        self.objects.insert(signature, name.clone());
        self.types.insert(name.clone(), ty);
        Ok(name)
    }

    // =========================================================================
    // Methods
    // =========================================================================

    fn build_methods(&mut self) -> Result<(BTreeMap<String, Method>, Vec<String>)> {
        let mut methods = BTreeMap::new();
        let mut order = Vec::new();
        let spec = self.spec;
        for (endpoint, item) in &spec.paths {
            for (verb, op) in item.operations() {
                let method = self.build_method(endpoint, verb, op, &item.parameters)?;
                if methods.contains_key(&method.name) {
                    return Err(SpecError::format(format!(
                        "duplicate operationId '{}'",
                        method.name
                    )));
                }
                order.push(method.name.clone());
                methods.insert(method.name.clone(), method);
            }
        }
        Ok((methods, order))
    }

    fn build_method(
        &mut self,
        endpoint: &str,
        verb: HttpMethod,
        op: &Operation,
        shared: &[RefOr<ParameterObject>],
    ) -> Result<Method> {
        let name = op
            .operation_id
            .as_deref()
            .map(safe_name)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| SpecError::format(format!("{} {} has no operationId", verb, endpoint)))?;

        let own = op
            .parameters
            .iter()
            .map(|p| self.parameter_object(p))
            .collect::<Result<Vec<_>>>()?;
        let mut declared: Vec<&ParameterObject> = Vec::new();
        for param in shared {
            let param = self.parameter_object(param)?;
            if !own.iter().any(|o| o.name == param.name && o.location == param.location) {
                declared.push(param);
            }
        }
        declared.extend(own);

        let mut params = Vec::with_capacity(declared.len() + 1);
        for param in declared {
            params.push(self.build_param(&name, param)?);
        }
        if let Some(body) = &op.request_body {
            params.push(self.build_body(&name, body)?);
        }

        let mut responses = Vec::new();
        for (code, response) in &op.responses {
            let Ok(status_code) = code.parse::<u16>() else {
                debug!(method = %name, code = %code, "skipping non-numeric response code");
                continue;
            };
            let response = self.response_object(response)?;
            responses.extend(self.build_responses(&name, status_code, response)?);
        }
        let primary_index = Method::select_primary(&responses);
        if primary_index.is_none() {
            warn!(method = %name, "no success response declared");
        }

        let mut types = BTreeSet::new();
        types.extend(params.iter().map(|p| p.type_name.clone()));
        types.extend(responses.iter().map(|r| r.type_name.clone()));
        let custom_types = types
            .iter()
            .map(|t| base_type(&self.types, t))
            .filter(|t| self.types.get(*t).map_or(false, |ty| !ty.is_intrinsic()))
            .map(str::to_string)
            .collect();

        Ok(Method {
            http_method: verb,
            endpoint: endpoint.to_string(),
            status: op.status.clone().unwrap_or_default(),
            summary: op.summary.clone().unwrap_or_default(),
            description: op.description.clone().unwrap_or_default(),
            deprecated: op.deprecated,
            activity_type: op.activity_type.clone().unwrap_or_default(),
            rate_limited: op.rate_limited,
            tag: op.tags.first().cloned().unwrap_or_else(|| DEFAULT_TAG.to_string()),
            params,
            responses,
            primary_index,
            types,
            custom_types,
            name,
        })
    }

    fn parameter_object<'a>(&self, param: &'a RefOr<ParameterObject>) -> Result<&'a ParameterObject>
    where
        's: 'a,
    {
        match param {
            RefOr::Item(p) => Ok(p),
            RefOr::Ref { reference } => match reference
                .strip_prefix(PARAMETER_PREFIX)
                .and_then(|key| self.spec.components.parameters.get(key))
            {
                Some(RefOr::Item(p)) => Ok(p),
                _ => Err(SpecError::unresolved(reference)),
            },
        }
    }

    fn response_object<'a>(&self, response: &'a RefOr<Response>) -> Result<&'a Response>
    where
        's: 'a,
    {
        match response {
            RefOr::Item(r) => Ok(r),
            RefOr::Ref { reference } => match reference
                .strip_prefix(RESPONSE_PREFIX)
                .and_then(|key| self.spec.components.responses.get(key))
            {
                Some(RefOr::Item(r)) => Ok(r),
                _ => Err(SpecError::unresolved(reference)),
            },
        }
    }

    fn build_param(&mut self, method: &str, param: &ParameterObject) -> Result<Parameter> {
        let location: ParamLocation = param.location.parse()?;
        let name = safe_name(&param.name);
        let hint = Hint {
            owner: method,
            member: &name,
            style: param.style.as_deref(),
        };
        let type_name = match &param.schema {
            Some(schema) => self.resolve(schema, hint)?,
            None => Intrinsic::String.name().to_string(),
        };
        let default = match &param.schema {
            Some(RefOr::Item(schema)) => schema.default.as_ref().map(default_text),
            _ => None,
        };
        Ok(Parameter {
            json_name: param.name.clone(),
            owner: method.to_string(),
            location,
            type_name,
            required: param.required || location == ParamLocation::Path,
            description: param.description.clone().unwrap_or_default(),
            default,
            style: param.style.clone(),
            deprecated: param.deprecated,
            name,
        })
    }

    fn build_body(&mut self, method: &str, body: &RefOr<RequestBody>) -> Result<Parameter> {
        let body = match body {
            RefOr::Item(b) => b,
            RefOr::Ref { reference } => match reference
                .strip_prefix(REQUEST_BODY_PREFIX)
                .and_then(|key| self.spec.components.request_bodies.get(key))
            {
                Some(RefOr::Item(b)) => b,
                _ => return Err(SpecError::unresolved(reference)),
            },
        };
        let media = body
            .content
            .get(JSON_MEDIA)
            .or_else(|| body.content.values().next());
        let type_name = match media.and_then(|m| m.schema.as_ref()) {
            Some(schema) => self.resolve(schema, Hint::new(method, "body"))?,
            None => Intrinsic::Any.name().to_string(),
        };
        Ok(Parameter {
            name: "body".to_string(),
            json_name: "body".to_string(),
            owner: method.to_string(),
            location: ParamLocation::Body,
            type_name,
            required: body.required.unwrap_or(true),
            description: body.description.clone().unwrap_or_default(),
            default: None,
            style: None,
            deprecated: false,
        })
    }

    fn build_responses(&mut self, method: &str, status_code: u16, response: &Response) -> Result<Vec<MethodResponse>> {
        if response.content.is_empty() {
            return Ok(vec![MethodResponse {
                status_code,
                media_type: String::new(),
                type_name: Intrinsic::Void.name().to_string(),
                description: response.description.clone(),
                primary: response.primary,
            }]);
        }
        let mut out = Vec::with_capacity(response.content.len());
        for (media_type, media) in &response.content {
            let type_name = match &media.schema {
                Some(schema) => self.resolve(schema, Hint::new(method, "response"))?,
                None => Intrinsic::Any.name().to_string(),
            };
            out.push(MethodResponse {
                status_code,
                media_type: media_type.clone(),
                type_name,
                description: response.description.clone(),
                primary: response.primary,
            });
        }
        Ok(out)
    }

    // =========================================================================
    // Derived Views
    // =========================================================================

    fn compute_read_only(&mut self) {
        let complex: Vec<(String, bool)> = self
            .types
            .values()
            .filter(|t| t.is_complex())
            .map(|t| {
                let mut props = t.properties().peekable();
                let any = props.peek().is_some();
                (t.name.clone(), any && props.all(|p| p.read_only))
            })
            .collect();
        for (name, read_only) in complex {
            if let Some(ty) = self.types.get_mut(&name) {
                ty.read_only = read_only;
            }
        }

        let collections: Vec<(String, bool)> = self
            .types
            .values()
            .filter(|t| t.is_collection())
            .map(|t| {
                let base = base_type(&self.types, &t.name);
                let read_only = self.types.get(base).map_or(false, |b| b.read_only);
                (t.name.clone(), read_only)
            })
            .collect();
        for (name, read_only) in collections {
            if let Some(ty) = self.types.get_mut(&name) {
                ty.read_only = read_only;
            }
        }
    }

    fn is_writeable(&self, prop: &Property) -> bool {
        !prop.read_only && !self.types.get(&prop.type_name).map_or(false, |t| t.read_only)
    }

    /// Register `Write<Name>` for every complex type with some, but not all,
    /// read-only properties. Returns source name -> writeable name.
    fn register_writeable(&mut self) -> BTreeMap<String, String> {
        let candidates: Vec<String> = self
            .types
            .values()
            .filter(|t| matches!(t.origin, TypeOrigin::Schema | TypeOrigin::Anonymous))
            .filter(|t| t.is_complex())
            .filter(|t| {
                let total = t.properties().count();
                let writeable = t.properties().filter(|p| self.is_writeable(p)).count();
                writeable > 0 && writeable < total
            })
            .map(|t| t.name.clone())
            .collect();

        let mut writers = BTreeMap::new();
        for name in &candidates {
            let writer = self.names.unique(&format!("Write{}", name));
            writers.insert(name.clone(), writer);
        }

        for name in &candidates {
            let Some(source) = self.types.get(name) else {
                continue;
            };
            let writer = writers[name].clone();
            let removed: Vec<&str> = source
                .properties()
                .filter(|p| !self.is_writeable(p))
                .map(|p| p.name.as_str())
                .collect();
            let properties: IndexMap<String, Property> = source
                .properties()
                .filter(|p| self.is_writeable(p))
                .map(|p| {
                    let mut prop = p.clone();
                    prop.owner = writer.clone();
                    if let Some(nested) = writers.get(&prop.type_name) {
                        prop.type_name = nested.clone();
                    }
                    (prop.name.clone(), prop)
                })
                .collect();
            let mut ty = Type::new(writer.clone(), TypeKind::Complex { properties }, TypeOrigin::Writeable);
            ty.description = format!(
                "Dynamic writeable type for {} removes:\n{}",
                name,
                removed.join(", ")
            );
            ty.status = source.status.clone();
            self.types.insert(writer, ty);
        }

        debug!(count = writers.len(), "registered writeable types");
        writers
    }

    /// Every name referenced anywhere in the model must have an entry
    fn validate(&self, methods: &BTreeMap<String, Method>) -> Result<()> {
        let check = |name: &str| -> Result<()> {
            if self.types.contains_key(name) {
                Ok(())
            } else {
                Err(SpecError::unresolved(name))
            }
        };
        for ty in self.types.values() {
            for reference in ty.references() {
                check(reference)?;
            }
        }
        for method in methods.values() {
            for param in &method.params {
                check(&param.type_name)?;
            }
            for response in &method.responses {
                check(&response.type_name)?;
            }
        }
        Ok(())
    }

    fn build_tags(&self, methods: &BTreeMap<String, Method>, order: &[String]) -> BTreeMap<String, Tag> {
        let mut tags: BTreeMap<String, Tag> = BTreeMap::new();
        for name in order {
            let Some(method) = methods.get(name) else {
                continue;
            };
            tags.entry(method.tag.clone())
                .or_insert_with(|| Tag {
                    name: method.tag.clone(),
                    ..Tag::default()
                })
                .methods
                .push(method.name.clone());
        }
        for declared in &self.spec.tags {
            let tag = tags.entry(declared.name.clone()).or_insert_with(|| Tag {
                name: declared.name.clone(),
                ..Tag::default()
            });
            tag.description = declared.description.clone().unwrap_or_default();
        }
        tags
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Intrinsic for a scalar schema from its `type` and `format`
fn intrinsic_for(schema: &Schema) -> Result<Intrinsic> {
    let format = schema.format.as_deref();
    let intrinsic = match schema.schema_type.as_deref() {
        Some("integer") => match format {
            Some("int64") => Intrinsic::Int64,
            _ => Intrinsic::Integer,
        },
        Some("number") => match format {
            Some("float") => Intrinsic::Float,
            _ => Intrinsic::Double,
        },
        Some("string") => format
            .and_then(Intrinsic::from_format)
            .unwrap_or(Intrinsic::String),
        Some("boolean") => Intrinsic::Boolean,
        Some("file") => Intrinsic::Binary,
        Some("object") | None => Intrinsic::Any,
        Some(other) => {
            return Err(SpecError::format(format!("unknown schema type '{}'", other)));
        }
    };
    Ok(intrinsic)
}

fn enum_values(values: &[Value]) -> Vec<EnumValue> {
    values.iter().filter_map(EnumValue::from_json).collect()
}

fn enum_signature(element: Intrinsic, values: &[EnumValue]) -> String {
    let joined: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("{}:{}", element, joined.join("|"))
}

fn default_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn apply_metadata(ty: &mut Type, schema: &Schema) {
    ty.description = schema.description.clone().unwrap_or_default();
    ty.title = schema.title.clone().unwrap_or_default();
    ty.status = schema.status.clone().unwrap_or_default();
    ty.deprecated = schema.deprecated;
    ty.default = schema.default.as_ref().map(default_text);
}
