use std::cell::Cell;

use wirework_compiler::diagnostic::{ErrorCategory, LookupError, WireTypeError};
use wirework_compiler::ir::{
    MethodDescriptor, NamedType, PrimitiveKind, ServiceInterfaceDescriptor, SourceLocation,
    TypeDescriptor,
};
use wirework_compiler::schema::{MessageField, RenderOptions, SchemaRegistry, WireType};
use wirework_compiler::source::{
    ParsedModule, ParsedModuleSet, ParsedPackage, SourceModel, StructDescriptor,
};
use wirework_compiler::CompilerError;

const MODULE: &str = "example.com/shop";
const COMMON: &str = "example.com/shop/common";

fn address() -> TypeDescriptor {
    TypeDescriptor::named(MODULE, COMMON, "Address")
}

fn model() -> ParsedModuleSet {
    ParsedModuleSet::new().with_module(
        ParsedModule::new(MODULE, "v1.2.0").with_package(
            COMMON,
            ParsedPackage::new("common")
                .with_struct(
                    StructDescriptor::new("Address")
                        .field("Street", TypeDescriptor::string())
                        .field("Zip", TypeDescriptor::string()),
                )
                .with_struct(
                    StructDescriptor::new("Blob")
                        .field("Payload", TypeDescriptor::bytes())
                        .field("Sizes", TypeDescriptor::sequence(TypeDescriptor::primitive(PrimitiveKind::Uint8))),
                )
                .with_declared_type("Status", TypeDescriptor::primitive(PrimitiveKind::Int)),
        ),
    )
}

fn iface(name: &str, methods: Vec<MethodDescriptor>) -> ServiceInterfaceDescriptor {
    let mut iface = ServiceInterfaceDescriptor::new(name, SourceLocation::new(MODULE, "v1.2.0", COMMON));
    iface.methods = methods;
    iface
}

fn field(name: &str, wire_type: WireType, tag: usize) -> MessageField {
    MessageField {
        name: name.to_string(),
        wire_type,
        tag,
    }
}

/// Counts how often struct fields are looked up.
struct CountingModel {
    inner: ParsedModuleSet,
    lookups: Cell<usize>,
}

impl SourceModel for CountingModel {
    fn resolve_struct(&self, ty: &NamedType) -> Result<&StructDescriptor, LookupError> {
        self.lookups.set(self.lookups.get() + 1);
        self.inner.resolve_struct(ty)
    }
}

#[test]
fn greeter_request_and_response() {
    let greeter = iface(
        "Greeter",
        vec![MethodDescriptor::rpc("SayHello")
            .arg("name", TypeDescriptor::string())
            .ret("", TypeDescriptor::string())
            .returning_error()],
    );

    let mut registry = SchemaRegistry::new();
    let schema = registry.derive(&model(), &greeter).unwrap();

    assert_eq!(schema.methods.len(), 1);
    assert_eq!(schema.methods[0].request, "Greeter_SayHello_Request");
    assert_eq!(schema.methods[0].response, "Greeter_SayHello_Response");
    assert_eq!(
        registry.message("Greeter_SayHello_Request").unwrap().fields,
        vec![field("name", WireType::String, 0)]
    );
    assert_eq!(
        registry.message("Greeter_SayHello_Response").unwrap().fields,
        vec![field("ret0", WireType::String, 0)]
    );
}

#[test]
fn byte_sequences_are_opaque_bytes() {
    let store = iface(
        "Store",
        vec![MethodDescriptor::rpc("Put")
            .arg("blob", TypeDescriptor::named(MODULE, COMMON, "Blob"))
            .arg("raw", TypeDescriptor::bytes())
            .returning_error()],
    );

    let mut registry = SchemaRegistry::new();
    registry.derive(&model(), &store).unwrap();

    let request = registry.message("Store_Put_Request").unwrap();
    assert_eq!(request.fields[1], field("raw", WireType::Bytes, 1));

    let blob = registry.message("Blob").unwrap();
    assert_eq!(blob.fields[0].wire_type, WireType::Bytes);
    assert_eq!(
        blob.fields[1].wire_type,
        WireType::Repeated(Box::new(WireType::Uint32))
    );
}

#[test]
fn shared_named_type_has_one_definition() {
    let source = CountingModel {
        inner: model(),
        lookups: Cell::new(0),
    };
    let billing = iface(
        "Billing",
        vec![MethodDescriptor::rpc("Charge").arg("to", address()).returning_error()],
    );
    let shipping = iface(
        "Shipping",
        vec![MethodDescriptor::rpc("Ship")
            .arg("to", TypeDescriptor::pointer(address()))
            .ret("stops", TypeDescriptor::sequence(address()))
            .returning_error()],
    );

    let mut registry = SchemaRegistry::new();
    let first = registry.derive(&source, &billing).unwrap();
    let second = registry.derive(&source, &shipping).unwrap();

    assert_eq!(source.lookups.get(), 1);
    assert_eq!(registry.messages().filter(|m| m.name == "Address").count(), 1);
    assert!(first.messages.contains(&"Address".to_string()));
    assert!(second.messages.contains(&"Address".to_string()));
    assert_eq!(
        registry.message("Address").unwrap().fields,
        vec![
            field("Street", WireType::String, 0),
            field("Zip", WireType::String, 1),
        ]
    );
}

#[test]
fn shared_type_is_rendered_in_every_document() {
    let billing = iface(
        "Billing",
        vec![MethodDescriptor::rpc("Charge").arg("to", address()).returning_error()],
    );
    let shipping = iface(
        "Shipping",
        vec![MethodDescriptor::rpc("Ship").arg("to", address()).returning_error()],
    );

    let model = model();
    let mut registry = SchemaRegistry::new();
    registry.derive(&model, &billing).unwrap();
    let schema = registry.derive(&model, &shipping).unwrap();

    let document = registry.render(&schema, &RenderOptions::new("gen/rpc", "proto"));
    assert!(document.contains("package rpc;"));
    assert!(document.contains("message Address {\n    string Street = 0;\n    string Zip = 1;\n}"));
}

#[test]
fn calling_convention_is_enforced() {
    let missing_ctx = iface(
        "Greeter",
        vec![MethodDescriptor::new("SayHello")
            .arg("name", TypeDescriptor::string())
            .returning_error()],
    );
    let err = SchemaRegistry::new().derive(&model(), &missing_ctx).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid method Greeter.SayHello due to missing context argument"
    );
    assert_eq!(err.category(), ErrorCategory::Configuration);

    let missing_error = iface(
        "Greeter",
        vec![MethodDescriptor::rpc("SayHello").ret("", TypeDescriptor::string())],
    );
    let err = SchemaRegistry::new().derive(&model(), &missing_error).unwrap_err();
    assert!(matches!(
        err,
        CompilerError::MissingErrorReturn { ref interface, ref method }
            if interface == "Greeter" && method == "SayHello"
    ));
}

#[test]
fn unsupported_map_key_is_named() {
    let service = iface(
        "Index",
        vec![MethodDescriptor::rpc("ByLocation")
            .arg(
                "entries",
                TypeDescriptor::map(address(), TypeDescriptor::string()),
            )
            .returning_error()],
    );

    let err = SchemaRegistry::new().derive(&model(), &service).unwrap_err();
    match &err {
        CompilerError::Unserializable { role, name, reason, .. } => {
            assert_eq!(role.to_string(), "argument");
            assert_eq!(name, "entries");
            assert!(matches!(reason, WireTypeError::InvalidMapKey { key } if key == "common.Address"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("Index.ByLocation"));
}

#[test]
fn repeated_maps_are_rejected() {
    let service = iface(
        "Index",
        vec![MethodDescriptor::rpc("All")
            .ret(
                "pages",
                TypeDescriptor::sequence(TypeDescriptor::map(
                    TypeDescriptor::string(),
                    TypeDescriptor::string(),
                )),
            )
            .returning_error()],
    );

    let mut registry = SchemaRegistry::new();
    let err = registry.derive(&model(), &service).unwrap_err();
    assert!(matches!(
        err,
        CompilerError::Unserializable { reason: WireTypeError::RepeatedMap { .. }, .. }
    ));
    assert!(registry.is_empty());
}

#[test]
fn missing_and_non_struct_types_are_lookup_errors() {
    let missing = iface(
        "Lookup",
        vec![MethodDescriptor::rpc("Find")
            .arg("q", TypeDescriptor::named(MODULE, COMMON, "Query"))
            .returning_error()],
    );
    let err = SchemaRegistry::new().derive(&model(), &missing).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Lookup);
    assert!(err.to_string().contains("could not find Query within"));

    let scalar = iface(
        "Lookup",
        vec![MethodDescriptor::rpc("Status")
            .ret("status", TypeDescriptor::named(MODULE, COMMON, "Status"))
            .returning_error()],
    );
    let err = SchemaRegistry::new().derive(&model(), &scalar).unwrap_err();
    assert!(matches!(
        err,
        CompilerError::Unserializable {
            reason: WireTypeError::Lookup(LookupError::NotAStruct { .. }),
            ..
        }
    ));
}

#[test]
fn tags_follow_signature_order() {
    let original = iface(
        "Orders",
        vec![MethodDescriptor::rpc("Place")
            .arg("sku", TypeDescriptor::string())
            .arg("count", TypeDescriptor::primitive(PrimitiveKind::Int32))
            .arg("to", address())
            .returning_error()],
    );
    let mut renamed = original.clone();
    renamed.methods[0].arguments[1].name = "quantity".to_string();

    let model = model();
    let mut first = SchemaRegistry::new();
    first.derive(&model, &original).unwrap();
    let mut second = SchemaRegistry::new();
    second.derive(&model, &renamed).unwrap();

    let tags = |registry: &SchemaRegistry| -> Vec<usize> {
        registry
            .message("Orders_Place_Request")
            .unwrap()
            .fields
            .iter()
            .map(|f| f.tag)
            .collect()
    };
    assert_eq!(tags(&first), vec![0, 1, 2]);
    assert_eq!(tags(&first), tags(&second));
}

#[test]
fn nested_collections_recurse() {
    let service = iface(
        "Tags",
        vec![MethodDescriptor::rpc("Index")
            .arg(
                "by_label",
                TypeDescriptor::map(
                    TypeDescriptor::string(),
                    TypeDescriptor::sequence(TypeDescriptor::string()),
                ),
            )
            .arg(
                "grid",
                TypeDescriptor::sequence(TypeDescriptor::sequence(TypeDescriptor::string())),
            )
            .arg(
                "nested",
                TypeDescriptor::map(
                    TypeDescriptor::string(),
                    TypeDescriptor::map(TypeDescriptor::string(), TypeDescriptor::string()),
                ),
            )
            .returning_error()],
    );

    let mut registry = SchemaRegistry::new();
    let schema = registry.derive(&model(), &service).unwrap();

    let request = registry.message("Tags_Index_Request").unwrap();
    assert_eq!(
        request.fields[0].wire_type,
        WireType::Map {
            key: Box::new(WireType::String),
            value: Box::new(WireType::Repeated(Box::new(WireType::String))),
        }
    );
    assert_eq!(
        request.fields[1].wire_type,
        WireType::Repeated(Box::new(WireType::Repeated(Box::new(WireType::String))))
    );
    assert_eq!(
        request.fields[2].wire_type,
        WireType::Map {
            key: Box::new(WireType::String),
            value: Box::new(WireType::Map {
                key: Box::new(WireType::String),
                value: Box::new(WireType::String),
            }),
        }
    );

    let document = registry.render(&schema, &RenderOptions::new("rpc", "proto"));
    assert!(document.contains("    map<string,repeated string> by_label = 0;\n"));
}

#[test]
fn non_payload_types_are_unserializable() {
    let cases = [
        TypeDescriptor::Opaque("chan int".to_string()),
        TypeDescriptor::CallContext,
        TypeDescriptor::ErrorSignal,
    ];

    for ty in cases {
        let service = iface(
            "Stream",
            vec![MethodDescriptor::rpc("Open").arg("sink", ty.clone()).returning_error()],
        );
        let mut registry = SchemaRegistry::new();
        let err = registry.derive(&model(), &service).unwrap_err();
        match &err {
            CompilerError::Unserializable { name, reason, .. } => {
                assert_eq!(name, "sink");
                assert!(
                    matches!(reason, WireTypeError::Unserializable { .. }),
                    "{ty}: unexpected reason {reason}"
                );
            }
            other => panic!("{ty}: unexpected error: {other}"),
        }
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(registry.is_empty());
    }
}

#[test]
fn explicit_name_clashing_with_generated_name_is_rejected() {
    let service = iface(
        "Pairs",
        vec![MethodDescriptor::rpc("Put")
            .arg("arg1", TypeDescriptor::string())
            .arg("", TypeDescriptor::string())
            .returning_error()],
    );

    let mut registry = SchemaRegistry::new();
    let err = registry.derive(&model(), &service).unwrap_err();
    assert!(matches!(
        err,
        CompilerError::DuplicateField { ref interface, ref method, ref name, .. }
            if interface == "Pairs" && method == "Put" && name == "arg1"
    ));
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(registry.is_empty());

    let repeated = iface(
        "Pairs",
        vec![MethodDescriptor::rpc("Get")
            .ret("value", TypeDescriptor::string())
            .ret("value", TypeDescriptor::string())
            .returning_error()],
    );
    let err = SchemaRegistry::new().derive(&model(), &repeated).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid method Pairs.Get: retval field value appears more than once"
    );
}

#[test]
fn third_same_named_struct_is_a_collision() {
    const VENDOR: &str = "example.com/vendor";
    let item = || StructDescriptor::new("Item").field("ID", TypeDescriptor::string());
    let model = model().with_module(
        ParsedModule::new(VENDOR, "v0.9.0")
            .with_package("example.com/vendor/catalog", ParsedPackage::new("catalog").with_struct(item()))
            .with_package("example.com/vendor/legacy", ParsedPackage::new("legacy").with_struct(item()))
            .with_package("example.com/vendor/old/legacy", ParsedPackage::new("legacy").with_struct(item())),
    );
    let service = iface(
        "Catalog",
        vec![MethodDescriptor::rpc("Merge")
            .arg("current", TypeDescriptor::named(VENDOR, "example.com/vendor/catalog", "Item"))
            .arg("legacy", TypeDescriptor::named(VENDOR, "example.com/vendor/legacy", "Item"))
            .arg("archived", TypeDescriptor::named(VENDOR, "example.com/vendor/old/legacy", "Item"))
            .returning_error()],
    );

    let mut registry = SchemaRegistry::new();
    let err = registry.derive(&model, &service).unwrap_err();
    match &err {
        CompilerError::Unserializable { name, reason, .. } => {
            assert_eq!(name, "archived");
            match reason {
                WireTypeError::NameCollision { name, first, second } => {
                    assert_eq!(name, "legacy_Item");
                    assert_eq!(first, "example.com/vendor:example.com/vendor/legacy.Item");
                    assert_eq!(second, "example.com/vendor:example.com/vendor/old/legacy.Item");
                }
                other => panic!("unexpected reason: {other}"),
            }
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(registry.is_empty());
}

#[test]
fn duplicate_method_names_collide() {
    let service = iface(
        "Greeter",
        vec![
            MethodDescriptor::rpc("SayHello")
                .arg("name", TypeDescriptor::string())
                .returning_error(),
            MethodDescriptor::rpc("SayHello")
                .arg("names", TypeDescriptor::sequence(TypeDescriptor::string()))
                .returning_error(),
        ],
    );

    let mut registry = SchemaRegistry::new();
    let err = registry.derive(&model(), &service).unwrap_err();
    assert!(matches!(
        err,
        CompilerError::MessageNameCollision { ref name, .. } if name == "Greeter_SayHello_Request"
    ));
    assert_eq!(err.category(), ErrorCategory::Conflict);
    assert!(registry.is_empty());
    assert!(registry.service(&service).is_none());
}

#[test]
fn failed_derivation_keeps_earlier_services() {
    const ORDERS: &str = "example.com/shop/orders";
    let model = model().with_module(
        ParsedModule::new(MODULE, "v1.2.0")
            .with_package(
                COMMON,
                ParsedPackage::new("common").with_struct(
                    StructDescriptor::new("Address")
                        .field("Street", TypeDescriptor::string())
                        .field("Zip", TypeDescriptor::string()),
                ),
            )
            .with_package(
                ORDERS,
                ParsedPackage::new("orders").with_struct(
                    StructDescriptor::new("Order")
                        .field("To", address())
                        .field("Done", TypeDescriptor::Opaque("chan struct{}".to_string())),
                ),
            ),
    );

    let billing = iface(
        "Billing",
        vec![MethodDescriptor::rpc("Charge").arg("to", address()).returning_error()],
    );
    let orders = iface(
        "Orders",
        vec![MethodDescriptor::rpc("Place")
            .arg("to", address())
            .arg("order", TypeDescriptor::named(MODULE, ORDERS, "Order"))
            .returning_error()],
    );

    let mut registry = SchemaRegistry::new();
    registry.derive(&model, &billing).unwrap();
    let before: Vec<String> = registry.messages().map(|m| m.name.clone()).collect();

    let err = registry.derive(&model, &orders).unwrap_err();
    assert!(matches!(
        err,
        CompilerError::Unserializable { reason: WireTypeError::InField { .. }, .. }
    ));

    let after: Vec<String> = registry.messages().map(|m| m.name.clone()).collect();
    assert_eq!(after, before);
    assert_eq!(
        registry.message("Address").unwrap().fields,
        vec![
            field("Street", WireType::String, 0),
            field("Zip", WireType::String, 1),
        ]
    );
    assert!(registry.message("Order").is_none());
    assert!(registry.message("Orders_Place_Request").is_none());
    assert!(registry.service(&billing).is_some());
    assert!(registry.service(&orders).is_none());

    // The interface can be derived once its payload is fixed.
    let mut fixed = orders.clone();
    fixed.methods[0].arguments.truncate(2);
    registry.derive(&model, &fixed).unwrap();
    assert!(registry.message("Orders_Place_Request").is_some());
}
