use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use tracing::debug;

use super::client::CompletionRequest;

/// 温度パラメータの許容範囲
pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 2.0;

/// トークン制限戦略を表現する列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLimitStrategy {
    /// `max_tokens` を使用（Groq/Llama系・4o系）
    MaxTokens,
    /// `max_completion_tokens` を使用（o系・5系モデル向け）
    MaxCompletionTokens,
}

/// モデル名からトークン制限戦略を判定する
pub fn determine_token_limit_strategy(model: &str) -> TokenLimitStrategy {
    let name = model.rsplit('/').next().unwrap_or(model);
    let completion_only = name.starts_with("gpt-5")
        || name.starts_with("o1")
        || name.starts_with("o3")
        || name.starts_with("o4");
    if completion_only {
        TokenLimitStrategy::MaxCompletionTokens
    } else {
        TokenLimitStrategy::MaxTokens
    }
}

/// 範囲外・非数の温度を丸める
pub fn clamp_temperature(value: f32) -> f32 {
    if value.is_nan() {
        return MIN_TEMPERATURE;
    }
    value.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
}

/// system + user 構成のメッセージ列を作る
fn build_messages(
    request: &CompletionRequest,
) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &request.system {
        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system.as_str())
                .build()?
                .into(),
        );
    }
    messages.push(
        ChatCompletionRequestUserMessageArgs::default()
            .content(request.user.as_str())
            .build()?
            .into(),
    );
    Ok(messages)
}

/// ChatCompletionリクエストを構築する
pub fn build_chat_request(
    model: &str,
    request: &CompletionRequest,
) -> Result<CreateChatCompletionRequest, OpenAIError> {
    let strategy = determine_token_limit_strategy(model);
    let temperature = clamp_temperature(request.temperature);

    let mut builder = CreateChatCompletionRequestArgs::default();
    builder.model(model).messages(build_messages(request)?);

    // o系・5系は既定以外の温度を受け付けないので送らない
    let req = match strategy {
        TokenLimitStrategy::MaxTokens => builder
            .max_tokens(request.max_tokens)
            .temperature(temperature)
            .build()?,
        TokenLimitStrategy::MaxCompletionTokens => {
            builder.max_completion_tokens(request.max_tokens).build()?
        }
    };

    debug!(
        target: "openai",
        model = %model,
        ?strategy,
        max_tokens = request.max_tokens,
        temperature = ?req.temperature,
        messages = req.messages.len(),
        "chat request built"
    );
    Ok(req)
}
