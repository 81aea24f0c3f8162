use zahri_text::{
    Bias, TOP_WORDS, WordCounter, annotated_names, apply_or_toggle_kind, project,
    remove_annotations, search_word,
};
use zahri_types::AnnotationKind;

const SAMPLES: &[&str] = &[
    "",
    "No markers at all.",
    "Hello [Mr. Smith]. And ^^Olivera Anna^^ met [John Doe]. Again ^^Olivera Anna^^.",
    "[] ^^   ^^ [  Mr. X  ]",
    "$$Toshkent$$ va $$Samar\nqand$$ shaharlari",
    "[Ali][Vali]^^Lola^^$$Xiva$$",
    "unclosed [bracket and ^^caret and $$dollar",
    "[a[b] ^^^^^ $$ $ $$",
    "Oʻgʻil [Oʻktam] va ^^Gʻuncha^^ xo’jalikda",
];

fn chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

#[test]
fn removing_markers_yields_plain_text() {
    for raw in SAMPLES {
        let projection = project(raw);
        let mut marker_positions: Vec<usize> = projection
            .annotations
            .iter()
            .flat_map(|span| {
                (span.open_raw_start..span.open_raw_end).chain(span.close_raw_start..span.close_raw_end)
            })
            .collect();
        marker_positions.sort_unstable();

        let stripped: String = raw
            .chars()
            .enumerate()
            .filter(|(idx, _)| marker_positions.binary_search(idx).is_err())
            .map(|(_, c)| c)
            .collect();
        assert_eq!(stripped, projection.plain, "raw: {raw:?}");
    }
}

#[test]
fn annotations_are_ordered_and_disjoint() {
    for raw in SAMPLES {
        let projection = project(raw);
        for pair in projection.annotations.windows(2) {
            assert!(pair[0].close_raw_end <= pair[1].open_raw_start, "raw: {raw:?}");
            assert!(pair[0].plain_end <= pair[1].plain_start, "raw: {raw:?}");
        }
        for span in &projection.annotations {
            assert!(span.plain_start < span.plain_end);
        }
    }
}

#[test]
fn segments_partition_the_plain_text() {
    for raw in SAMPLES {
        let projection = project(raw);
        let raw_chars = chars(raw);
        let plain_chars = chars(&projection.plain);
        let mut cursor = 0;
        for seg in &projection.segments {
            assert_eq!(seg.plain_start, cursor, "raw: {raw:?}");
            assert_eq!(
                &raw_chars[seg.raw_start..seg.raw_end],
                &plain_chars[seg.plain_start..seg.plain_end]
            );
            cursor = seg.plain_end;
        }
        assert_eq!(cursor, plain_chars.len(), "raw: {raw:?}");
    }
}

#[test]
fn plain_offsets_map_onto_matching_raw_chars() {
    for raw in SAMPLES {
        let projection = project(raw);
        let raw_chars = chars(raw);
        let plain_chars = chars(&projection.plain);
        for (i, expected) in plain_chars.iter().enumerate() {
            let after = projection.plain_to_raw(i, Bias::After);
            assert_eq!(raw_chars[after], *expected, "raw: {raw:?} index {i}");

            let before = projection.plain_to_raw(i + 1, Bias::Before);
            assert_eq!(raw_chars[before - 1], *expected, "raw: {raw:?} index {i}");
        }
    }
}

#[test]
fn toggling_twice_restores_the_text() {
    let raw = "Bugun Toshkent shahrida Aziz va Nodira uchrashdi.";
    let plain_len = raw.chars().count();
    for kind in AnnotationKind::ALL {
        for (start, end) in [(6, 14), (24, 28), (0, 5), (32, plain_len)] {
            let first = apply_or_toggle_kind(raw, start, end, kind);
            assert!(first.changed, "{kind} {start}..{end}");
            assert_eq!(project(&first.text).plain, raw);

            let second = apply_or_toggle_kind(&first.text, start, end, kind);
            assert!(second.changed);
            assert_eq!(second.text, raw, "{kind} {start}..{end}");
        }
    }
}

#[test]
fn edits_compose_without_touching_neighbours() {
    let raw = "Aziz va Nodira Toshkentda.";
    let step1 = apply_or_toggle_kind(raw, 0, 4, AnnotationKind::Male);
    let step2 = apply_or_toggle_kind(&step1.text, 8, 14, AnnotationKind::Female);
    let step3 = apply_or_toggle_kind(&step2.text, 15, 25, AnnotationKind::Toponym);
    assert_eq!(step3.text, "[Aziz] va ^^Nodira^^ $$Toshkentda$$.");

    let names = annotated_names(&step3.text);
    assert_eq!(names.male, vec!["Aziz"]);
    assert_eq!(names.female, vec!["Nodira"]);
    assert_eq!(names.toponym, vec!["Toshkentda"]);

    let cleared = remove_annotations(&step3.text, 0, 25);
    assert_eq!(cleared.text, raw);
}

#[test]
fn top_list_stays_bounded_and_sorted() {
    let vocabulary = [
        "gazeta", "maqola", "yil", "xo'jalik", "cho'l", "shahar", "qishloq", "bola", "ona",
        "ota", "ish", "kun", "suv", "non", "yo'l",
    ];
    let mut counter = WordCounter::new();
    let mut state: u64 = 42;
    for _ in 0..2_000 {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let word = vocabulary[(state >> 33) as usize % vocabulary.len()];
        counter.observe(word);

        let top = counter.top_words();
        assert!(top.len() <= TOP_WORDS);
        for pair in top.windows(2) {
            assert!(counter.count(&pair[0]) >= counter.count(&pair[1]));
        }
        assert!(top.iter().all(|word| counter.table().contains_key(word)));
    }
    assert_eq!(counter.total_words(), 2_000);
}

#[test]
fn apostrophe_variants_match_in_search() {
    let result = search_word("Bu xo’jalik haqida maqola.", "xo'jalik", 10);
    assert_eq!(result.frequency, 1);

    let result = search_word("Bu xo'jalik haqida maqola.", "xoʼjalik", 10);
    assert_eq!(result.frequency, 1);
}
