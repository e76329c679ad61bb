//! OpenAI-compatible chat completion backend.

use super::{ChatModel, ModelChunk, ModelStream, ModelTurn, ToolSpec};
use crate::agent::{Message, ToolInvocation};
use crate::config::ModelSettings;
use crate::error::{Result, SnakkError};
use crate::openai::create_client_for;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs, CreateChatCompletionStreamResponse, FunctionCall,
    FunctionObject, ReasoningEffort,
};
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, instrument};

/// Chat model served by an OpenAI-compatible endpoint.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    reasoning_effort: Option<ReasoningEffort>,
}

impl OpenAIChatModel {
    /// Create a model from settings.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let reasoning_effort = settings
            .reasoning_effort
            .as_deref()
            .map(parse_reasoning_effort)
            .transpose()?;

        Ok(Self {
            client: create_client_for(settings)?,
            model: settings.name.clone(),
            reasoning_effort,
        })
    }

    fn build_request(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<CreateChatCompletionRequest> {
        let messages = messages
            .iter()
            .map(to_openai_message)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);

        if !tools.is_empty() {
            builder.tools(tools.iter().map(to_openai_tool).collect::<Vec<_>>());
        }
        if let Some(effort) = &self.reasoning_effort {
            builder.reasoning_effort(effort.clone());
        }

        builder.build().map_err(|e| SnakkError::Agent(e.to_string()))
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip(self, messages, tools), fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelTurn> {
        let request = self.build_request(messages, tools)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SnakkError::OpenAI(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SnakkError::Agent("No response from model".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolInvocation {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect::<Vec<_>>();

        debug!("Model returned {} tool call(s)", tool_calls.len());

        Ok(ModelTurn {
            content: choice.message.content,
            tool_calls,
        })
    }

    #[instrument(skip(self, messages, tools), fields(model = %self.model, messages = messages.len()))]
    async fn stream(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelStream> {
        let request = self.build_request(messages, tools)?;

        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| SnakkError::OpenAI(format!("Chat API error: {}", e)))?;

        let chunks = stream.flat_map(|item| {
            let chunks: Vec<Result<ModelChunk>> = match item {
                Ok(response) => chunks_from_response(response).into_iter().map(Ok).collect(),
                Err(e) => vec![Err(SnakkError::OpenAI(format!("Stream error: {}", e)))],
            };
            futures::stream::iter(chunks)
        });

        Ok(Box::pin(chunks))
    }
}

/// Split one streamed response into chunks, text first.
fn chunks_from_response(response: CreateChatCompletionStreamResponse) -> Vec<ModelChunk> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Vec::new();
    };

    let mut chunks = Vec::new();
    if let Some(content) = choice.delta.content {
        chunks.push(ModelChunk::Token(content));
    }
    for call in choice.delta.tool_calls.unwrap_or_default() {
        let (name, arguments) = match call.function {
            Some(function) => (function.name, function.arguments.unwrap_or_default()),
            None => (None, String::new()),
        };
        chunks.push(ModelChunk::ToolCall {
            index: call.index,
            id: call.id,
            name,
            arguments,
        });
    }
    chunks
}

fn to_openai_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
    let build_err = |e: async_openai::error::OpenAIError| SnakkError::Agent(e.to_string());

    let built = match message {
        Message::System { content } => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(build_err)?
            .into(),
        Message::User { content } => ChatCompletionRequestUserMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(build_err)?
            .into(),
        Message::Assistant {
            content,
            tool_calls,
        } => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(content) = content {
                args.content(content.clone());
            }
            if !tool_calls.is_empty() {
                args.tool_calls(
                    tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            args.build().map_err(build_err)?.into()
        }
        Message::Tool {
            tool_call_id,
            content,
        } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(tool_call_id.clone())
            .content(content.clone())
            .build()
            .map_err(build_err)?
            .into(),
    };

    Ok(built)
}

fn to_openai_tool(spec: &ToolSpec) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: spec.name.clone(),
            description: Some(spec.description.clone()),
            parameters: Some(spec.parameters.clone()),
            strict: None,
        },
    }
}

fn parse_reasoning_effort(value: &str) -> Result<ReasoningEffort> {
    match value.to_lowercase().as_str() {
        "low" => Ok(ReasoningEffort::Low),
        "medium" => Ok(ReasoningEffort::Medium),
        "high" => Ok(ReasoningEffort::High),
        other => Err(SnakkError::Config(format!("Unknown reasoning effort: {}", other))),
    }
}
