//! Property-based tests for prompt formatting and the chain.

mod common;

use common::MockChatModel;
use machine_translator::chain::{PromptTemplate, Role, TranslationChain, TranslationRequest};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prompt_interpolates_values_verbatim(language in any::<String>(), text in any::<String>()) {
        let input = TranslationRequest { language: language.clone(), text: text.clone() };

        let prompt = PromptTemplate::translation().format(&input);

        prop_assert_eq!(prompt.system.role, Role::System);
        prop_assert_eq!(
            prompt.system.content,
            format!("Translate the following text into {}.", language)
        );
        prop_assert_eq!(prompt.user.role, Role::User);
        prop_assert_eq!(prompt.user.content, text);
    }

    #[test]
    fn echo_round_trip_preserves_text(language in "[A-Za-z ]{1,20}", text in any::<String>()) {
        let model = MockChatModel::echo();
        let chain = TranslationChain::new(model.clone());
        let input = TranslationRequest { language: language.clone(), text: text.clone() };

        let output = futures::executor::block_on(chain.invoke(&input)).unwrap();

        prop_assert_eq!(
            output,
            format!("Translate the following text into {}.\n{}", language, text)
        );
        prop_assert_eq!(model.calls(), 1);
    }
}
