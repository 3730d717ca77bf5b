use crate::{Context, Layer, Options, Reply, Responder, phrases};

fn pets_bot() -> Responder<&'static str> {
    let mut cats = Context::new().named("cats");
    cats.add_entry_phrase("(.* )?(talk about|tell( me)? about) cats?.*", "Sure, I love cats").unwrap();
    cats.add_responses(phrases![
        "(.* )?favou?rite thing about (them|cats?).*" => "They are fuzzy",
        "(.* )?(do )?you have (one|(a )?cat).*" => "No, computer programs can't have cats.",
    ])
    .unwrap();

    let mut cat_food = Context::new().named("cat food");
    cat_food.add_entry_phrase("(.* )?(talk about|tell( me)? about) food?.*", "Sure, let's talk about cat food").unwrap();
    cat_food.add_response("(.* )?(favou?rite|best) type( of food)?.*", "Computer programs do not eat cat food.").unwrap();
    cat_food
        .add_exit_phrase(
            "(.* )?(stop talking about ((cat )?food|this)|talk about something else).*",
            "OK, no more cat food talk.",
        )
        .unwrap();
    cats.add_context(cat_food);

    let mut dogs = Context::new().named("dogs");
    dogs.add_entry_phrase("(.* )?(talk about|tell( me)? about) dogs?.*", "Sure, I think dogs are great").unwrap();
    dogs.add_responses(phrases![
        "(.* )?favou?rite thing about (them|dogs?).*" => "They are loyal",
        "(.* )?(do )?you have (one|(a )?dog).*" => "No, computer programs can't have dogs.",
    ])
    .unwrap();

    let mut bot = Responder::new();
    bot.add_responses(phrases![
        "(.* )?hello.*" => "Hello!",
        "(.* )?(good)?bye.*" => "Bye.",
    ])
    .unwrap();
    bot.add_default_response("Mmhmm.");
    bot.add_contexts([cats, dogs]);
    bot
}

fn say(bot: &mut Responder<&'static str>, text: &str) -> String {
    match bot.get_response(text) {
        Reply::Matched { value, .. } | Reply::Default(value) => value.to_string(),
        Reply::Echo(text) => text,
    }
}

fn active_name<T>(bot: &Responder<T>) -> Option<&str> {
    bot.active_context().and_then(Context::name)
}

#[test]
fn nested_conversation() {
    let mut bot = pets_bot();
    bot.compile().unwrap();

    let script = [
        ("hey, let's talk about cats", "Sure, I love cats", Some("cats")),
        ("what's your favourite thing about them?", "They are fuzzy", Some("cats")),
        ("tell me about food", "Sure, let's talk about cat food", Some("cat food")),
        ("what is the best type?", "Computer programs do not eat cat food.", Some("cat food")),
        // Parent responses stay reachable from a child and make the parent active.
        ("do you have one?", "No, computer programs can't have cats.", Some("cats")),
        ("talk about food", "Sure, let's talk about cat food", Some("cat food")),
        ("stop talking about this", "OK, no more cat food talk.", Some("cats")),
        ("OK, let's talk about dogs now", "Sure, I think dogs are great", Some("dogs")),
        ("do you have one?", "No, computer programs can't have dogs.", Some("dogs")),
        ("what's your favourite thing about them?", "They are loyal", Some("dogs")),
        ("hello there", "Hello!", None),
        ("do you have one?", "Mmhmm.", None),
    ];

    for (input, expected, active) in script {
        assert_eq!(say(&mut bot, input), expected, "input {input:?}");
        assert_eq!(active_name(&bot), active, "active context after {input:?}");
    }
}

#[test]
fn child_contexts_need_their_parent() {
    let mut bot = pets_bot();
    assert_eq!(say(&mut bot, "tell me about food"), "Mmhmm.");
    assert_eq!(bot.active_path(), None);

    say(&mut bot, "tell me about dogs");
    assert_eq!(bot.active_path(), Some(&[1][..]));
    // Dogs has no food child.
    assert_eq!(say(&mut bot, "tell me about food"), "Mmhmm.");
    assert_eq!(bot.active_path(), Some(&[1][..]));
}

#[test]
fn re_entry_while_active() {
    let mut bot = pets_bot();
    say(&mut bot, "talk about cats");
    let reply = bot.get_response("tell me about cats");
    assert_eq!(reply.layer(), Some(Layer::Entry));
    assert_eq!(reply.value(), Some(&"Sure, I love cats"));
    assert_eq!(active_name(&bot), Some("cats"));
}

#[test]
fn top_level_exit_leaves_every_context() {
    let mut ctx = Context::new();
    ctx.add_entry_phrase("knock knock", "who's there?").unwrap();
    ctx.add_response("(.*) who\\??", "haha").unwrap();
    ctx.add_exit_phrase("enough", "fine").unwrap();

    let mut bot = Responder::new();
    bot.add_context(ctx);

    assert_eq!(say(&mut bot, "Knock knock"), "who's there?");
    assert_eq!(say(&mut bot, "lettuce who?"), "haha");
    assert_eq!(bot.get_response("enough").layer(), Some(Layer::Exit));
    assert!(bot.active_context().is_none());
    assert_eq!(say(&mut bot, "lettuce who?"), "lettuce who?");
}

#[test]
fn contextless_match_restarts_chains() {
    let mut ctx = Context::new();
    ctx.add_entry_phrase("count", "ready").unwrap();
    ctx.add_chained_phrases(phrases!["0" => "zero", "1" => "one", "2" => "two", "3" => "three"]).unwrap();

    let mut bot = Responder::new();
    bot.add_response("q", "quit").unwrap();
    bot.add_context(ctx);

    let steps = [("count", "ready"), ("0", "zero"), ("1", "one"), ("2", "two"), ("3", "three"), ("3", "three")];
    for (input, expected) in steps {
        assert_eq!(say(&mut bot, input), expected, "input {input:?}");
    }

    // An unrecognized input keeps the cursor.
    assert_eq!(say(&mut bot, "7"), "7");
    assert_eq!(say(&mut bot, "3"), "three");

    assert_eq!(say(&mut bot, "q"), "quit");
    assert!(bot.contexts()[0].cursor().is_none());
    assert_eq!(say(&mut bot, "1"), "1");

    assert_eq!(say(&mut bot, "count"), "ready");
    let reply = bot.get_response("0");
    assert_eq!(reply.layer(), Some(Layer::Chain { chain: 0, step: 0 }));
    assert_eq!(say(&mut bot, "1"), "one");
}

#[test]
fn options_apply_to_contextless_responses() {
    let mut strict = Responder::with_options(Options::default().with_case_insensitive(false));
    strict.add_response("hello", "hi").unwrap();
    assert_eq!(say(&mut strict, "hello"), "hi");
    assert_eq!(say(&mut strict, "HELLO"), "HELLO");

    let mut relaxed = Responder::new();
    relaxed.add_response("hello", "hi").unwrap();
    assert_eq!(say(&mut relaxed, "HELLO"), "hi");
}

#[test]
fn patterns_are_anchored() {
    let mut bot = Responder::new();
    bot.add_response(["yes", "yep|yeah"], "agreed").unwrap();

    let cases = [
        ("yes", "agreed"),
        ("yep", "agreed"),
        ("yeah", "agreed"),
        ("yes please", "yes please"),
        ("oh yeah", "oh yeah"),
        ("", ""),
    ];
    for (input, expected) in cases {
        assert_eq!(say(&mut bot, input), expected, "input {input:?}");
    }
}
