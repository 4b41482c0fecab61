//! Binary-mode encode pipeline.

use std::sync::Arc;

use bytes::Bytes;

use crate::codec::CodecRegistry;
use crate::error::{BindingError, BindingResult};
use crate::event::Envelope;
use crate::extensions::ExtensionRegistry;
use crate::mapping::headers::{CONTENT_LENGTH, CONTENT_TYPE};
use crate::mapping::{self, HeaderMapper, KeyValues};
use crate::pipeline::Pipeline;
use crate::wire::{HeaderMapping, WireMessage};

/// Intermediate state of one encode run.
#[derive(Debug, Default)]
pub struct EncodeState {
    pub attributes: KeyValues,
    pub extensions: KeyValues,
    pub headers: HeaderMapping,
    pub body: Option<Bytes>,
}

/// Envelope → headers + body.
#[derive(Debug)]
pub struct Marshaller {
    pipeline: Pipeline<Envelope, EncodeState>,
}

impl Marshaller {
    pub fn new(
        mapper: HeaderMapper,
        extensions: Arc<ExtensionRegistry>,
        codecs: Arc<CodecRegistry>,
    ) -> Self {
        let attribute_mapper = mapper.clone();
        let pipeline = Pipeline::new("marshal")
            .stage("marshal-attributes", marshal_attributes)
            .stage("attributes-to-headers", move |_, state: &mut EncodeState| {
                attribute_mapper.attributes_to_headers(&state.attributes, &mut state.headers);
                Ok(())
            })
            .stage("marshal-extensions", move |envelope, state| {
                marshal_extensions(&extensions, envelope, state)
            })
            .stage("extensions-to-headers", move |_, state: &mut EncodeState| {
                mapper.extensions_to_headers(&state.extensions, &mut state.headers)
            })
            .stage("encode-payload", move |envelope, state| {
                encode_payload(&codecs, envelope, state)
            });

        Self { pipeline }
    }

    pub fn marshal(&self, envelope: &Envelope) -> BindingResult<WireMessage> {
        let state = self.pipeline.run(envelope, EncodeState::default())?;
        Ok(WireMessage::new(state.headers, state.body))
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.pipeline.stage_names()
    }
}

pub fn marshal_attributes(envelope: &Envelope, state: &mut EncodeState) -> BindingResult<()> {
    state.attributes = mapping::attributes::marshal(envelope.attributes());
    Ok(())
}

pub fn marshal_extensions(
    registry: &ExtensionRegistry,
    envelope: &Envelope,
    state: &mut EncodeState,
) -> BindingResult<()> {
    state.extensions = mapping::extensions::marshal(envelope.extensions(), registry)?;
    Ok(())
}

/// Encode the payload with the codec for the envelope's content type and
/// set Content-Length. No payload means an empty body and length zero.
pub fn encode_payload(
    codecs: &CodecRegistry,
    envelope: &Envelope,
    state: &mut EncodeState,
) -> BindingResult<()> {
    let Some(data) = envelope.data() else {
        state.body = None;
        state.headers.insert(CONTENT_LENGTH, "0");
        return Ok(());
    };

    let content_type = envelope
        .content_type()
        .unwrap_or(codecs.default_content_type())
        .to_string();
    let codec = codecs.resolve(Some(&content_type))?;
    let body = codec
        .encode(data)
        .map_err(|source| BindingError::PayloadEncoding {
            content_type: content_type.clone(),
            source,
        })?;

    if !state.headers.contains(CONTENT_TYPE) {
        state.headers.insert(CONTENT_TYPE, content_type);
    }
    state.headers.insert(CONTENT_LENGTH, body.len().to_string());
    state.body = Some(body);
    Ok(())
}
