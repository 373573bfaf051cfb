use crate::ollama::ChatMessage;

pub const QUERY_GENERATOR_PROMPT: &str = "You are not an AI assistant that responds to a user. You are an AI web search query generator model. You will be given a prompt to an AI assistant with web search capabilities. If you are being used, an AI has determined this prompt to the actual AI assistant requires web search for more recent data. You must determine what data the assistant needs from search and generate the best possible DuckDuckGo query to find that data. Do not respond with anything but a query that an expert human search engine user would type into DuckDuckGo to find the needed data. Keep your queries simple, without any search engine code. Just type a query likely to retrieve the data we need.";

pub const CONTAINS_DATA_PROMPT: &str = "You are not an AI assistant that responds to a user. You are an AI model designed to analyze data scraped from a web page's text to assist an actual AI assistant in responding correctly with up to date information. Consider the USER_PROMPT that was sent to the actual AI assistant and analyze the PAGE_TEXT to see if it does contain the data needed to construct an intelligent, correct response. This web PAGE_TEXT was retrieved from a search engine using the SEARCH_QUERY that is also attached to user messages in this conversation. All user messages in this conversation will have the format of:\n    PAGE_TEXT: entire page text from the best search result based off the search snippet.\n    USER_PROMPT: the prompt sent to an actual web search enabled AI assistant.\n    SEARCH_QUERY: the search query that was used to find data determined necessary for the assistant to respond correctly and usefully.\nYou must determine whether the PAGE_TEXT actually contains reliable and necessary data for the AI assistant to respond. You only have two possible responses to user messages in this conversation: True or False.";

pub const SEARCH_OR_NOT_PROMPT: &str = "You are not an AI assistant. Your only task is to decide if the last user prompt in a conversation with an AI assistant requires more data to be retrieved from a web search for the assistant to respond correctly. The conversation may or may not already have exactly the context data needed. If the assistant should search the web for more data before responding to ensure a correct response, simply respond True. If the conversation already has the context, or a web search is not what an intelligent human would do to respond correctly to the last message in the conversation, respond False. Do not generate any explanations. Only generate True or False as a response in this conversation using the logic in these instructions.";

const QUERY_REQUEST_TEMPLATE: &str = "CREATE A SEARCH QUERY FOR THIS PROMPT: \n{prompt}";

pub fn query_request(prompt: &str) -> String {
    QUERY_REQUEST_TEMPLATE.replace("{prompt}", prompt)
}

pub fn relevance_request(content: &str, prompt: &str, query: &str) -> String {
    format!(
        "PAGE_TEXT: {} \nUSER_PROMPT: {} \nSEARCH_QUERY: {}",
        content, prompt, query
    )
}

/// Flattens a conversation into one message for the search gate.
pub fn conversation_request(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.label(), m.content.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_request_puts_prompt_on_second_line() {
        assert_eq!(
            query_request("latest rust release"),
            "CREATE A SEARCH QUERY FOR THIS PROMPT: \nlatest rust release"
        );
    }

    #[test]
    fn relevance_request_labels_each_input() {
        let message = relevance_request("page body", "who won?", "winner 2024");
        assert_eq!(
            message,
            "PAGE_TEXT: page body \nUSER_PROMPT: who won? \nSEARCH_QUERY: winner 2024"
        );
    }

    #[test]
    fn page_text_with_placeholders_is_kept_verbatim() {
        let message = relevance_request("literal {query} text", "p", "q");
        assert!(message.starts_with("PAGE_TEXT: literal {query} text \n"));
    }

    #[test]
    fn conversation_is_rendered_one_line_per_message() {
        let rendered = conversation_request(&[
            ChatMessage::user("What is Rust?"),
            ChatMessage::assistant("A language.\n"),
            ChatMessage::user("Who won yesterday's match?"),
        ]);
        assert_eq!(
            rendered,
            "USER: What is Rust?\nASSISTANT: A language.\nUSER: Who won yesterday's match?"
        );
    }
}
