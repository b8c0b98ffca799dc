//! Unit tests for the reducer, progress mapping, and the aggregator shell.

#[cfg(test)]
mod aggregator_tests {
    use crate::bus::ModelBus;
    use crate::model::ViewModel;
    use crate::stream::aggregator::{
        layer_progress, parse_event, reduce, step_progress, StreamAggregator,
    };

    fn apply_raw(model: &mut ViewModel, raw: &str) {
        let event = parse_event(raw).expect("valid test record");
        reduce(model, &event);
    }

    // ============= Progress Table Tests =============

    #[test]
    fn test_step_progress_exact_values() {
        assert_eq!(step_progress("init"), Some(5));
        assert_eq!(step_progress("initialized"), Some(10));
        assert_eq!(step_progress("fundamentals_analyst"), Some(15));
        assert_eq!(step_progress("sentiment_analyst"), Some(20));
        assert_eq!(step_progress("news_analyst"), Some(25));
        assert_eq!(step_progress("technical_analyst"), Some(30));
        assert_eq!(step_progress("researcher_debate"), Some(45));
        assert_eq!(step_progress("trader"), Some(65));
        assert_eq!(step_progress("risk_assessment"), Some(80));
        assert_eq!(step_progress("portfolio_manager"), Some(90));
        assert_eq!(step_progress("complete"), Some(100));
        assert_eq!(step_progress("something_new"), None);
    }

    #[test]
    fn test_layer_fallback_values() {
        assert_eq!(layer_progress(1), Some(15));
        assert_eq!(layer_progress(2), Some(40));
        assert_eq!(layer_progress(3), Some(65));
        assert_eq!(layer_progress(4), Some(85));
        assert_eq!(layer_progress(0), None);
        assert_eq!(layer_progress(5), None);
    }

    // ============= Status Reduction Tests =============

    #[test]
    fn test_status_sets_progress_and_stock_name() {
        let mut model = ViewModel::new();
        apply_raw(
            &mut model,
            r#"{"type":"status","step":"init","layer":0,"message":"starting","stock_name":"贵州茅台"}"#,
        );

        assert_eq!(model.progress, 5);
        assert_eq!(model.stage, 0);
        assert_eq!(model.stock_name.as_deref(), Some("贵州茅台"));
        assert_eq!(model.status_line.as_deref(), Some("starting"));
    }

    #[test]
    fn test_status_unknown_step_uses_layer_fallback() {
        let mut model = ViewModel::new();
        apply_raw(&mut model, r#"{"type":"status","step":"warming_up","layer":2}"#);
        assert_eq!(model.progress, 40);
    }

    #[test]
    fn test_status_unknown_step_no_layer_leaves_progress() {
        let mut model = ViewModel::new();
        model.progress = 30;
        apply_raw(&mut model, r#"{"type":"status","step":"warming_up"}"#);
        assert_eq!(model.progress, 30);
    }

    #[test]
    fn test_status_step_maps_stage_by_role_family() {
        let mut model = ViewModel::new();
        apply_raw(&mut model, r#"{"type":"status","step":"trader","layer":3}"#);
        assert_eq!(model.stage, 3);

        apply_raw(&mut model, r#"{"type":"status","step":"portfolio_manager","layer":4}"#);
        assert_eq!(model.stage, 4);
    }

    #[test]
    fn test_progress_never_regresses() {
        let mut model = ViewModel::new();
        apply_raw(&mut model, r#"{"type":"status","step":"trader"}"#);
        assert_eq!(model.progress, 65);

        // A stale analyst status arriving late must not move progress back.
        apply_raw(&mut model, r#"{"type":"status","step":"fundamentals_analyst"}"#);
        assert_eq!(model.progress, 65);
        assert_eq!(model.stage, 3);
    }

    #[test]
    fn test_monotonicity_across_full_sequence() {
        let sequence = [
            r#"{"type":"status","step":"init"}"#,
            r#"{"type":"agent_output","role":"technical_analyst","data":{"content":"X"}}"#,
            r#"{"type":"status","step":"researcher_debate"}"#,
            r#"{"type":"agent_output","role":"bullish_researcher","data":{"score":7.0}}"#,
            r#"{"type":"status","step":"trader"}"#,
            r#"{"type":"risk_assessment","data":{"aggressive":"a","neutral":"n","conservative":"c"}}"#,
            r#"{"type":"final_result","data":{"recommendation":"BUY","confidence":"HIGH"}}"#,
        ];

        let mut model = ViewModel::new();
        let mut last_progress = 0;
        let mut last_stage = 0;
        for raw in sequence {
            apply_raw(&mut model, raw);
            assert!(model.progress >= last_progress);
            assert!(model.stage >= last_stage);
            last_progress = model.progress;
            last_stage = model.stage;
        }
        assert_eq!(model.progress, 100);
        assert_eq!(model.stage, 4);
    }

    // ============= Agent Output Tests =============

    #[test]
    fn test_analyst_outputs_fill_their_fields() {
        let mut model = ViewModel::new();
        apply_raw(
            &mut model,
            r#"{"type":"agent_output","role":"fundamentals_analyst","layer":1,"data":{"content":"solid fundamentals","score":8.5}}"#,
        );
        apply_raw(
            &mut model,
            r#"{"type":"agent_output","role":"news_analyst","layer":1,"data":{"content":"neutral news"}}"#,
        );

        assert_eq!(model.layer1.fundamental.as_deref(), Some("solid fundamentals"));
        assert_eq!(model.layer1.news.as_deref(), Some("neutral news"));
        assert!(model.layer1.sentiment.is_none());
        assert!(model.layer1.technical.is_none());
        assert_eq!(model.stage, 1);
    }

    #[test]
    fn test_field_independence_between_layers() {
        let mut model = ViewModel::new();
        apply_raw(
            &mut model,
            r#"{"type":"agent_output","role":"technical_analyst","data":{"content":"macd up"}}"#,
        );
        apply_raw(
            &mut model,
            r#"{"type":"final_result","data":{"recommendation":"HOLD","confidence":"LOW"}}"#,
        );
        let layer1_before = model.layer1.clone();
        let layer3_before = model.layer3.clone();

        apply_raw(
            &mut model,
            r#"{"type":"agent_output","role":"bullish_researcher","data":{"content":"bull case","score":7.2}}"#,
        );

        assert_eq!(model.layer1, layer1_before);
        assert_eq!(model.layer3, layer3_before);
        assert_eq!(model.layer2.bull_score, Some(7.2));
        assert_eq!(model.layer2.bull_view.as_deref(), Some("bull case"));
    }

    #[test]
    fn test_last_write_wins_per_field() {
        let mut model = ViewModel::new();
        apply_raw(
            &mut model,
            r#"{"type":"agent_output","role":"sentiment_analyst","data":{"content":"first"}}"#,
        );
        apply_raw(
            &mut model,
            r#"{"type":"agent_output","role":"sentiment_analyst","data":{"content":"second"}}"#,
        );
        assert_eq!(model.layer1.sentiment.as_deref(), Some("second"));
    }

    #[test]
    fn test_unknown_role_is_noop() {
        let mut model = ViewModel::new();
        let before = model.clone();
        apply_raw(
            &mut model,
            r#"{"type":"agent_output","role":"macro_strategist","data":{"content":"?"}}"#,
        );
        assert_eq!(model, before);
    }

    // ============= Trader / Final Result Merge Tests =============

    const FINAL: &str = r#"{"type":"final_result","data":{"recommendation":"BUY","confidence":"HIGH"}}"#;
    const TRADER: &str =
        r#"{"type":"agent_output","role":"trader","data":{"content":"reason text"}}"#;

    #[test]
    fn test_final_then_trader_merge() {
        let mut model = ViewModel::new();
        apply_raw(&mut model, FINAL);
        apply_raw(&mut model, TRADER);

        assert_eq!(model.layer3.action.as_deref(), Some("BUY"));
        assert_eq!(model.layer3.confidence.as_deref(), Some("HIGH"));
        assert_eq!(model.layer3.reasoning.as_deref(), Some("reason text"));
    }

    #[test]
    fn test_trader_then_final_merge_is_identical() {
        let mut forward = ViewModel::new();
        apply_raw(&mut forward, FINAL);
        apply_raw(&mut forward, TRADER);

        let mut reverse = ViewModel::new();
        apply_raw(&mut reverse, TRADER);
        apply_raw(&mut reverse, FINAL);

        assert_eq!(forward.layer3, reverse.layer3);
    }

    #[test]
    fn test_trader_fallback_action_and_confidence() {
        let mut model = ViewModel::new();
        apply_raw(
            &mut model,
            r#"{"type":"agent_output","role":"trader","data":{"content":"thin book","recommendation":"HOLD"}}"#,
        );

        // No final_result yet: trader's recommendation and the MEDIUM
        // confidence fallback stand in.
        assert_eq!(model.layer3.action.as_deref(), Some("HOLD"));
        assert_eq!(model.layer3.confidence.as_deref(), Some("MEDIUM"));
        assert_eq!(model.stage, 3);
    }

    #[test]
    fn test_trader_does_not_clobber_final_action() {
        let mut model = ViewModel::new();
        apply_raw(&mut model, FINAL);
        apply_raw(
            &mut model,
            r#"{"type":"agent_output","role":"trader","data":{"content":"r","recommendation":"SELL"}}"#,
        );
        assert_eq!(model.layer3.action.as_deref(), Some("BUY"));
        assert_eq!(model.layer3.confidence.as_deref(), Some("HIGH"));
    }

    // ============= Risk / Final / Error Tests =============

    #[test]
    fn test_risk_assessment_fills_layer4() {
        let mut model = ViewModel::new();
        apply_raw(
            &mut model,
            r#"{"type":"risk_assessment","data":{"aggressive":"all in","neutral":"half","conservative":"wait"}}"#,
        );

        assert_eq!(model.layer4.aggressive.as_deref(), Some("all in"));
        assert_eq!(model.layer4.balanced.as_deref(), Some("half"));
        assert_eq!(model.layer4.conservative.as_deref(), Some("wait"));
        assert_eq!(model.stage, 4);
        assert_eq!(model.progress, 80);
    }

    #[test]
    fn test_final_result_terminal_signal() {
        let mut model = ViewModel::new();
        apply_raw(
            &mut model,
            r#"{"type":"final_result","data":{"recommendation":"BUY","confidence":"HIGH","scores":{"bullish":7.0,"bearish":4.5,"score_diff":2.5}}}"#,
        );

        assert_eq!(model.progress, 100);
        assert!(model.finished());
        assert_eq!(model.layer3.action.as_deref(), Some("BUY"));
        assert!(model.scores.is_some());
    }

    #[test]
    fn test_error_keeps_partial_results() {
        let mut model = ViewModel::new();
        apply_raw(
            &mut model,
            r#"{"type":"agent_output","role":"fundamentals_analyst","data":{"content":"ok"}}"#,
        );
        apply_raw(&mut model, r#"{"type":"error","message":"LLM timeout"}"#);
        apply_raw(
            &mut model,
            r#"{"type":"agent_output","role":"sentiment_analyst","data":{"content":"late"}}"#,
        );

        assert_eq!(model.error.as_deref(), Some("LLM timeout"));
        assert!(model.failed());
        assert_eq!(model.layer1.fundamental.as_deref(), Some("ok"));
        assert_eq!(model.layer1.sentiment.as_deref(), Some("late"));
    }

    #[test]
    fn test_debate_payload_retained_raw() {
        let mut model = ViewModel::new();
        apply_raw(
            &mut model,
            r#"{"type":"debate_triggered","data":{"score_diff":4.2,"message":"divergence"}}"#,
        );

        let debate = model.debate.expect("debate payload stored");
        assert_eq!(debate["score_diff"], 4.2);
        // Informational only.
        assert_eq!(model.stage, 0);
        assert_eq!(model.progress, 0);
    }

    #[test]
    fn test_unknown_event_type_is_noop() {
        let mut model = ViewModel::new();
        let before = model.clone();
        apply_raw(&mut model, r#"{"type":"heartbeat","data":{"seq":42}}"#);
        assert_eq!(model, before);
    }

    // ============= Aggregator Shell Tests =============

    #[test]
    fn test_apply_line_skips_malformed_record() {
        let mut agg = StreamAggregator::new(ModelBus::new());

        assert!(agg.apply_line(
            r#"{"type":"agent_output","role":"news_analyst","data":{"content":"a"}}"#
        ));
        assert!(!agg.apply_line(r#"{"type":"agent_output","role":"#));
        assert!(agg.apply_line(
            r#"{"type":"agent_output","role":"technical_analyst","data":{"content":"b"}}"#
        ));

        assert_eq!(agg.model().layer1.news.as_deref(), Some("a"));
        assert_eq!(agg.model().layer1.technical.as_deref(), Some("b"));
    }

    #[test]
    fn test_apply_line_ignores_blank_input() {
        let mut agg = StreamAggregator::new(ModelBus::new());
        assert!(!agg.apply_line(""));
        assert!(!agg.apply_line("   \t "));
        assert_eq!(*agg.model(), ViewModel::new());
    }

    #[test]
    fn test_apply_line_publishes_to_bus() {
        let bus = ModelBus::new();
        let mut agg = StreamAggregator::new(bus.clone());

        agg.apply_line(r#"{"type":"status","step":"init"}"#);
        assert_eq!(bus.latest().progress, 5);

        agg.apply_line(r#"{"type":"status","step":"trader"}"#);
        assert_eq!(bus.latest().progress, 65);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let bus = ModelBus::new();
        let mut agg = StreamAggregator::new(bus.clone());

        agg.apply_line(r#"{"type":"status","step":"trader","stock_name":"X"}"#);
        agg.apply_line(r#"{"type":"error","message":"boom"}"#);
        agg.reset();

        assert_eq!(*agg.model(), ViewModel::new());
        assert_eq!(bus.latest(), ViewModel::new());
    }
}
