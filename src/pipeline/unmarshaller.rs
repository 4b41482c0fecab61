//! Binary-mode decode pipeline.

use std::sync::Arc;

use crate::codec::CodecRegistry;
use crate::error::{BindingError, BindingResult};
use crate::event::{Attributes, Data, Envelope};
use crate::extensions::{ExtensionRegistry, Extensions};
use crate::mapping::{self, HeaderMapper, KeyValues};
use crate::pipeline::Pipeline;
use crate::wire::WireMessage;

/// Intermediate state of one decode run.
#[derive(Debug, Default)]
pub struct DecodeState {
    pub attribute_values: KeyValues,
    pub attributes: Option<Attributes>,
    pub data: Option<Data>,
    pub extension_values: KeyValues,
    pub extensions: Extensions,
}

/// Headers + body → envelope.
#[derive(Debug)]
pub struct Unmarshaller {
    pipeline: Pipeline<WireMessage, DecodeState>,
}

impl Unmarshaller {
    pub fn new(
        mapper: HeaderMapper,
        extensions: Arc<ExtensionRegistry>,
        codecs: Arc<CodecRegistry>,
    ) -> Self {
        let attribute_mapper = mapper.clone();
        let pipeline = Pipeline::new("unmarshal")
            .stage("headers-to-attributes", move |wire: &WireMessage, state: &mut DecodeState| {
                state.attribute_values = attribute_mapper.headers_to_attributes(&wire.headers);
                Ok(())
            })
            .stage("parse-attributes", parse_attributes)
            .stage("decode-payload", move |wire, state| decode_payload(&codecs, wire, state))
            .stage("headers-to-extensions", move |wire: &WireMessage, state: &mut DecodeState| {
                state.extension_values = mapper.headers_to_extensions(&wire.headers);
                Ok(())
            })
            .stage("unmarshal-extensions", move |_, state: &mut DecodeState| {
                state.extensions =
                    mapping::extensions::unmarshal(&state.extension_values, &extensions);
                Ok(())
            });

        Self { pipeline }
    }

    /// Decode a fully buffered message.
    pub fn unmarshal(&self, wire: &WireMessage) -> BindingResult<Envelope> {
        let state = self.pipeline.run(wire, DecodeState::default())?;
        build(state)
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.pipeline.stage_names()
    }
}

pub fn parse_attributes(_: &WireMessage, state: &mut DecodeState) -> BindingResult<()> {
    state.attributes = Some(mapping::attributes::unmarshal(&state.attribute_values)?);
    Ok(())
}

/// Decode the body with the codec for the content type resolved by
/// [`parse_attributes`]. An empty body yields no payload.
pub fn decode_payload(
    codecs: &CodecRegistry,
    wire: &WireMessage,
    state: &mut DecodeState,
) -> BindingResult<()> {
    let attributes = state.attributes.as_ref().ok_or(BindingError::StageOrder {
        stage: "decode-payload",
        requires: "parse-attributes",
    })?;

    let body = match &wire.body {
        Some(body) if !body.is_empty() => body,
        _ => {
            state.data = None;
            return Ok(());
        }
    };

    let codec = codecs.resolve(attributes.content_type())?;
    let data = codec
        .decode(body)
        .map_err(|source| BindingError::PayloadEncoding {
            content_type: attributes
                .content_type()
                .unwrap_or(codecs.default_content_type())
                .to_string(),
            source,
        })?;
    state.data = Some(data);
    Ok(())
}

/// Terminal stage: assemble and re-validate the envelope.
pub fn build(state: DecodeState) -> BindingResult<Envelope> {
    let attributes = state.attributes.ok_or(BindingError::StageOrder {
        stage: "build",
        requires: "parse-attributes",
    })?;
    Ok(Envelope::builder()
        .attributes(attributes)
        .maybe_data(state.data)
        .extensions(state.extensions)
        .build()?)
}
