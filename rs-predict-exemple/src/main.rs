use rs_predict_core::{MarkovModel, ModelError, DEFAULT_MAX_RESULTS};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Create a trigram model: two words of context predict the third
    let mut model = MarkovModel::new(3)?;

    // Each call is trained separately, n-grams never span two calls
    model.train("hello how are you today");
    model.train("how are you doing");
    model.train("how are we going to do this");
    model.train("Are you sure? Are you coming?");

    // Punctuation and case are ignored, "How are" matches "how are"
    println!("'How are' -> {:?}", model.predict("How are", DEFAULT_MAX_RESULTS));

    // Unknown two-word context, backs off to the last word "you"
    println!("'thank you' -> {:?}", model.predict("thank you", DEFAULT_MAX_RESULTS));

    // Nothing known at all
    println!("'zebra' -> {:?}", model.predict("zebra", DEFAULT_MAX_RESULTS));

    // Repeated phrases weigh more
    for _ in 0..3 {
        model.train("are you ready");
    }
    println!("'are you' (top 1) -> {:?}", model.predict("are you", 1));

    // Sample a short continuation, each word drawn by frequency
    let mut rng = rand::rng();
    let mut sentence = String::from("how are");
    for _ in 0..4 {
        match model.sample(&sentence, &mut rng) {
            Some(word) => {
                sentence.push(' ');
                sentence.push_str(&word);
            }
            None => break,
        }
    }
    println!("Sampled: {}", sentence);

    // Orders below 2 are rejected and the model is left untouched
    match model.set_order(1) {
        Ok(_) => println!("Should not happen"),
        Err(ModelError::InvalidOrder(n)) => println!("Order {} is invalid, must be >= 2", n),
        Err(e) => println!("Unexpected error: {}", e),
    }

    // Switching order keeps the existing chains
    model.set_order(2)?;
    model.train("see you soon");
    println!("Status after order change: {:?}", model.status());

    // Clearing forgets everything but the order
    model.clear();
    println!("Status after clear: {:?}", model.status());
    println!("'how are' after clear -> {:?}", model.predict("how are", DEFAULT_MAX_RESULTS));

    Ok(())
}
