//! A hand-assembled class-file builder for the decoder tests.
//!
//! The builder serializes constant-pool entries as they are registered and
//! keeps their 1-based indices, so tests can wire up cross-references
//! exactly — including deliberately broken ones.

#[derive(Debug)]
pub struct ClassFileBuilder {
    pool: Vec<u8>,
    pool_count: u16,
    minor_version: u16,
    major_version: u16,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}

impl ClassFileBuilder {
    pub fn new() -> Self {
        Self {
            pool: Vec::new(),
            pool_count: 1,
            minor_version: 0,
            major_version: 52,
            access_flags: 0,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        }
    }

    fn claim_slots(&mut self, width: u16) -> u16 {
        let index = self.pool_count;
        self.pool_count += width;
        index
    }

    /// Adds a Utf8 entry with the given payload bytes and returns its index.
    pub fn raw_utf8(&mut self, bytes: &[u8]) -> u16 {
        self.pool.push(1);
        self.pool.extend((bytes.len() as u16).to_be_bytes());
        self.pool.extend(bytes);
        self.claim_slots(1)
    }

    /// Adds a Utf8 entry holding ASCII text and returns its index.
    pub fn utf8(&mut self, text: &str) -> u16 {
        assert!(text.is_ascii(), "use raw_utf8 for non-ASCII payloads");
        self.raw_utf8(text.as_bytes())
    }

    /// Adds a Long entry, which occupies two slots.
    pub fn long(&mut self, value: i64) -> u16 {
        self.pool.push(5);
        self.pool.extend(value.to_be_bytes());
        self.claim_slots(2)
    }

    /// Adds a Class entry pointing at an arbitrary name index.
    pub fn class_at(&mut self, name_index: u16) -> u16 {
        self.pool.push(7);
        self.pool.extend(name_index.to_be_bytes());
        self.claim_slots(1)
    }

    /// Adds a Utf8 + Class pair for an internal name.
    pub fn class(&mut self, internal_name: &str) -> u16 {
        let name_index = self.utf8(internal_name);
        self.class_at(name_index)
    }

    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major_version = major;
        self.minor_version = minor;
        self
    }

    pub fn access_flags(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn this_class(mut self, index: u16) -> Self {
        self.this_class = index;
        self
    }

    pub fn super_class(mut self, index: u16) -> Self {
        self.super_class = index;
        self
    }

    pub fn interface(mut self, index: u16) -> Self {
        self.interfaces.push(index);
        self
    }

    /// Serializes an attribute from already-registered pool indices.
    fn attribute(name_index: u16, payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(name_index.to_be_bytes());
        bytes.extend((payload.len() as u32).to_be_bytes());
        bytes.extend(payload);
        bytes
    }

    /// A `Signature` attribute; registers the needed pool entries.
    pub fn signature_attribute(&mut self, signature: &str) -> Vec<u8> {
        let name_index = self.utf8("Signature");
        let signature_index = self.utf8(signature);
        Self::attribute(name_index, &signature_index.to_be_bytes())
    }

    /// An `Exceptions` attribute; registers the needed pool entries.
    pub fn exceptions_attribute(&mut self, exceptions: &[&str]) -> Vec<u8> {
        let name_index = self.utf8("Exceptions");
        let class_indices: Vec<u16> = exceptions.iter().map(|it| self.class(it)).collect();
        let mut payload = Vec::new();
        payload.extend((class_indices.len() as u16).to_be_bytes());
        for index in class_indices {
            payload.extend(index.to_be_bytes());
        }
        Self::attribute(name_index, &payload)
    }

    fn member(&mut self, flags: u16, name: &str, descriptor: &str, attributes: &[Vec<u8>]) -> Vec<u8> {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut bytes = Vec::new();
        bytes.extend(flags.to_be_bytes());
        bytes.extend(name_index.to_be_bytes());
        bytes.extend(descriptor_index.to_be_bytes());
        bytes.extend((attributes.len() as u16).to_be_bytes());
        for attribute in attributes {
            bytes.extend(attribute);
        }
        bytes
    }

    pub fn field(mut self, flags: u16, name: &str, descriptor: &str, attributes: &[Vec<u8>]) -> Self {
        let bytes = self.member(flags, name, descriptor, attributes);
        self.fields.push(bytes);
        self
    }

    pub fn method(mut self, flags: u16, name: &str, descriptor: &str, attributes: &[Vec<u8>]) -> Self {
        let bytes = self.member(flags, name, descriptor, attributes);
        self.methods.push(bytes);
        self
    }

    pub fn class_attribute(mut self, attribute: Vec<u8>) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(0xCAFE_BABEu32.to_be_bytes());
        bytes.extend(self.minor_version.to_be_bytes());
        bytes.extend(self.major_version.to_be_bytes());
        bytes.extend(self.pool_count.to_be_bytes());
        bytes.extend(&self.pool);
        bytes.extend(self.access_flags.to_be_bytes());
        bytes.extend(self.this_class.to_be_bytes());
        bytes.extend(self.super_class.to_be_bytes());
        bytes.extend((self.interfaces.len() as u16).to_be_bytes());
        for index in &self.interfaces {
            bytes.extend(index.to_be_bytes());
        }
        bytes.extend((self.fields.len() as u16).to_be_bytes());
        for field in &self.fields {
            bytes.extend(field);
        }
        bytes.extend((self.methods.len() as u16).to_be_bytes());
        for method in &self.methods {
            bytes.extend(method);
        }
        bytes.extend((self.attributes.len() as u16).to_be_bytes());
        for attribute in &self.attributes {
            bytes.extend(attribute);
        }
        bytes
    }
}

/// A minimal well-formed class: `public final class Empty {}` in the
/// default package, with the synthesized default constructor.
pub fn empty_class() -> Vec<u8> {
    let mut builder = ClassFileBuilder::new();
    let this_class = builder.class("Empty");
    let super_class = builder.class("java/lang/Object");
    builder
        .access_flags(0x0001 | 0x0010 | 0x0020) // public final, ACC_SUPER
        .this_class(this_class)
        .super_class(super_class)
        .method(0x0001, "<init>", "()V", &[])
        .build()
}
