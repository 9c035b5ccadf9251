use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use quiz_page_enhancer::query::{attr, classes, has_class, style, text};
use quiz_page_enhancer::{
    AnswerChecker, Dom, Effect, EnhancerOptions, KeyEvent, MissingChecker, Ordinal,
    ScrollBehavior, ScrollBlock, Session,
};

fn page(questions: usize) -> String {
    let mut body = String::from(r#"<button class="theme-toggle">Tema</button>"#);
    for n in 1..=questions {
        body.push_str(&format!(
            r#"<div class="question" id="q{n}">
                 <p>{n}. Soru</p>
                 <textarea></textarea>
                 <button onclick="checkAnswer({n})">Kontrol Et</button>
                 <div id="feedback{n}"></div>
               </div>"#
        ));
    }
    format!("<!doctype html><html><head><title>Quiz</title></head><body>{body}</body></html>")
}

fn ord(n: usize) -> Ordinal {
    Ordinal::new(n).unwrap()
}

fn fill_width<C: AnswerChecker>(session: &Session<C>) -> String {
    style(&session.enhancer().toolbar().fill, "width").unwrap_or_default()
}

fn set_feedback(dom: &mut Dom, n: usize, body: &str, class: &str) {
    let node = dom.by_id(&format!("feedback{n}")).unwrap();
    dom.set_text(&node, body);
    dom.set_attr(&node, "class", class);
}

/// Records calls; writes "Doğru" for ordinals not listed in `failing`.
fn recording_checker(
    calls: Rc<RefCell<Vec<usize>>>,
    failing: &'static [usize],
) -> impl FnMut(&mut Dom, Ordinal) -> anyhow::Result<()> {
    move |dom: &mut Dom, ordinal: Ordinal| {
        calls.borrow_mut().push(ordinal.get());
        if failing.contains(&ordinal.get()) {
            anyhow::bail!("checker exploded on {ordinal}");
        }
        set_feedback(dom, ordinal.get(), "Doğru", "feedback correct");
        Ok(())
    }
}

#[test]
fn empty_feedback_reads_zero_percent() {
    let session = Session::load(&page(4), MissingChecker, EnhancerOptions::default()).unwrap();
    let snapshot = session.progress();
    assert_eq!(snapshot.total, 4);
    assert_eq!(snapshot.percent, 0);
    assert_eq!(fill_width(&session), "0%");
}

#[test]
fn answered_feedback_drives_percentage_through_notifications() {
    let mut session = Session::load(&page(4), MissingChecker, EnhancerOptions::default()).unwrap();
    session.update_dom(|dom| {
        set_feedback(dom, 1, "Doğru", "feedback correct");
        set_feedback(dom, 3, "Doğru", "feedback correct");
        set_feedback(dom, 4, "Doğru", "feedback correct");
    });
    // round(3 / 4 * 100)
    assert_eq!(session.progress().percent, 75);
    assert_eq!(fill_width(&session), "75%");
}

#[test]
fn error_feedback_marks_done_without_counting() {
    let mut session = Session::load(&page(2), MissingChecker, EnhancerOptions::default()).unwrap();
    session.update_dom(|dom| set_feedback(dom, 2, "Yanlış", "feedback error"));

    let snapshot = session.progress();
    assert_eq!(snapshot.answered, 0);
    assert_eq!(fill_width(&session), "0%");
    let marker = session.enhancer().quick_nav_marker(ord(2)).unwrap();
    assert!(has_class(marker, "done"));
    let marker = session.enhancer().quick_nav_marker(ord(1)).unwrap();
    assert!(!has_class(marker, "done"));
}

#[test]
fn class_change_alone_recomputes_progress() {
    let mut session = Session::load(&page(2), MissingChecker, EnhancerOptions::default()).unwrap();
    session.update_dom(|dom| set_feedback(dom, 1, "Doğru", "feedback"));
    assert_eq!(fill_width(&session), "50%");

    session.update_dom(|dom| {
        let node = dom.by_id("feedback1").unwrap();
        dom.add_class(&node, "error");
    });
    assert_eq!(fill_width(&session), "0%");
}

#[test]
fn writes_below_the_feedback_element_are_not_observed() {
    let html = r#"<div class="question">
                    <p>1. Soru</p>
                    <div id="feedback1" class="feedback"><span></span></div>
                  </div>"#;
    let mut session = Session::load(html, MissingChecker, EnhancerOptions::default()).unwrap();
    assert_eq!(fill_width(&session), "0%");

    session.update_dom(|dom| {
        let inner = dom.query("#feedback1 > span").unwrap();
        dom.set_text(&inner, "Doğru");
    });
    // A fresh measurement sees the answer; the rendered bar was never refreshed.
    assert_eq!(session.progress().answered, 1);
    assert_eq!(fill_width(&session), "0%");
}

#[test]
fn three_question_example_then_reset() {
    let mut session = Session::load(&page(3), MissingChecker, EnhancerOptions::default()).unwrap();
    session.update_dom(|dom| set_feedback(dom, 2, "Correct", "feedback"));
    assert_eq!(session.progress().percent, 33);
    assert_eq!(fill_width(&session), "33%");

    session.click_selector("#kc-reset").unwrap();
    assert_eq!(session.progress().percent, 0);
    assert_eq!(fill_width(&session), "0%");
    for n in 1..=3 {
        let feedback = session.dom().by_id(&format!("feedback{n}")).unwrap();
        assert_eq!(text(&feedback), "");
        assert!(classes(&feedback).is_empty());
    }
    let marker = session.enhancer().quick_nav_marker(ord(2)).unwrap();
    assert!(!has_class(marker, "done"));
}

#[test]
fn check_all_calls_every_ordinal_in_order_despite_failures() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let checker = recording_checker(calls.clone(), &[1, 3]);
    let mut session = Session::load(&page(5), checker, EnhancerOptions::default()).unwrap();

    session.click_selector("#kc-checkall").unwrap();

    assert_eq!(*calls.borrow(), vec![1, 2, 3, 4, 5]);
    let snapshot = session.progress();
    assert_eq!(snapshot.answered, 3);
    assert_eq!(snapshot.percent, 60);
    assert_eq!(fill_width(&session), "60%");
}

#[test]
fn check_all_refreshes_progress_only_after_the_loop() {
    let widths = Rc::new(RefCell::new(Vec::new()));
    let seen = widths.clone();
    let checker = move |dom: &mut Dom, ordinal: Ordinal| -> anyhow::Result<()> {
        let fill = dom.query("#kc-progress > i").unwrap();
        seen.borrow_mut().push(style(&fill, "width").unwrap_or_default());
        set_feedback(dom, ordinal.get(), "Doğru", "feedback");
        Ok(())
    };
    let mut session = Session::load(&page(3), checker, EnhancerOptions::default()).unwrap();
    session.click_selector("#kc-checkall").unwrap();

    assert_eq!(*widths.borrow(), vec!["0%", "0%", "0%"]);
    assert_eq!(fill_width(&session), "100%");
}

#[test]
fn collapse_toggle_round_trip() {
    let mut session = Session::load(&page(2), MissingChecker, EnhancerOptions::default()).unwrap();
    let block = session.dom().by_id("q1").unwrap();
    let toggle = session.enhancer().collapse_button(ord(1)).unwrap().clone();
    let classes_before = classes(&block);
    let label_before = text(&toggle);

    session.click(&toggle);
    assert!(has_class(&block, "collapsed"));
    assert_eq!(text(&toggle), "Göster");
    // Inputs stay usable.
    assert!(attr(&session.dom().query("#q1 textarea").unwrap(), "disabled").is_none());

    session.click(&toggle);
    assert_eq!(classes(&block), classes_before);
    assert_eq!(text(&toggle), label_before);
}

#[test]
fn theme_toggle_round_trip() {
    let mut session = Session::load(&page(1), MissingChecker, EnhancerOptions::default()).unwrap();
    let root = session.dom().root().unwrap();

    session.click_selector(".theme-toggle").unwrap();
    assert!(has_class(&root, "dark-mode"));
    assert!(session.theme().unwrap().is_dark());

    session.click_selector(".theme-toggle").unwrap();
    let button = session.theme().unwrap().button().clone();
    assert!(!has_class(&root, "dark-mode"));
    assert!(!has_class(&button, "active"));
}

#[test]
fn quick_nav_click_scrolls_and_focuses() {
    let mut session = Session::load(&page(3), MissingChecker, EnhancerOptions::default()).unwrap();
    session.click_selector(r#".kq[data-ordinal="3"]"#).unwrap();
    let block = session.dom().by_id("q3").unwrap();
    let area = session.dom().query("#q3 textarea").unwrap();
    assert!(session.dom().focused() == Some(&area));
    assert!(session.dom().effects().iter().any(|e| matches!(
        e,
        Effect::ScrollIntoView { target, behavior: ScrollBehavior::Smooth, block: ScrollBlock::Center } if *target == block
    )));
}

#[test]
fn ctrl_enter_checks_the_focused_question_only() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let checker = recording_checker(calls.clone(), &[]);
    let mut session = Session::load(&page(3), checker, EnhancerOptions::default()).unwrap();

    // Focus outside any question does nothing.
    session.focus_selector(".theme-toggle").unwrap();
    let outcome = session.key_down(&KeyEvent::new("Enter").ctrl());
    assert!(!outcome.default_prevented);
    assert!(calls.borrow().is_empty());

    session.focus_selector("#q2 textarea").unwrap();
    session.key_down(&KeyEvent::new("Enter").ctrl());
    assert_eq!(*calls.borrow(), vec![2]);
    assert_eq!(session.progress().answered, 1);
}

#[test]
fn alt_a_checks_all_and_prevents_default() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let checker = recording_checker(calls.clone(), &[]);
    let mut session = Session::load(&page(3), checker, EnhancerOptions::default()).unwrap();

    let outcome = session.key_down(&KeyEvent::new("A").alt());
    assert!(outcome.default_prevented);
    assert_eq!(*calls.borrow(), vec![1, 2, 3]);
    assert_eq!(session.progress().percent, 100);

    let outcome = session.key_down(&KeyEvent::new("b").alt());
    assert!(!outcome.default_prevented);
    assert_eq!(calls.borrow().len(), 3);
}

#[test]
fn feedback_is_revealed_after_the_check_delay() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let checker = recording_checker(calls.clone(), &[]);
    let mut session = Session::load(&page(2), checker, EnhancerOptions::default()).unwrap();
    let feedback = session.dom().by_id("feedback2").unwrap();
    let reveals = |session: &Session<_>| {
        session
            .dom()
            .effects()
            .iter()
            .filter(|e| matches!(e, Effect::ScrollIntoView { target, .. } if *target == feedback))
            .count()
    };

    session.click_selector("#q2 .kc-check-btn").unwrap();
    assert_eq!(*calls.borrow(), vec![2]);
    assert_eq!(session.scheduler().pending(), 1);
    assert_eq!(reveals(&session), 0);

    session.advance_time(Duration::from_millis(149));
    assert_eq!(reveals(&session), 0);

    session.advance_time(Duration::from_millis(1));
    assert_eq!(reveals(&session), 1);
    assert_eq!(session.scheduler().pending(), 0);
    assert_eq!(fill_width(&session), "50%");
}

#[test]
fn configured_delay_is_honored() {
    let options = EnhancerOptions {
        check_delay_ms: 400,
        ..EnhancerOptions::default()
    };
    let mut session = Session::load(&page(1), MissingChecker, options).unwrap();
    session.click_selector(".kc-check-btn").unwrap();
    session.advance_time(Duration::from_millis(399));
    assert_eq!(session.scheduler().pending(), 1);
    session.flush_timers();
    assert_eq!(session.scheduler().pending(), 0);
    assert_eq!(session.scheduler().now(), Duration::from_millis(400));
}

#[test]
fn bare_page_degrades_to_toolbar_only() {
    let html = r#"<div class="question"><span>Başlıksız</span></div>"#;
    let mut session = Session::load(html, MissingChecker, EnhancerOptions::default()).unwrap();
    assert!(session.theme().is_none());
    assert!(session.enhancer().collapse_button(ord(1)).is_none());
    assert!(session.dom().query(".kc-check-btn").is_none());

    // The checker is missing entirely; check all still completes.
    session.click_selector("#kc-checkall").unwrap();
    session.click_selector("#kc-reset").unwrap();
    assert_eq!(session.progress().percent, 0);
    assert!(session.click_selector("#does-not-exist").is_err());
}
