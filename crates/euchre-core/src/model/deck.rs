use crate::error::EuchreError;
use crate::model::card::Card;
use crate::model::hand::Hand;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub const DECK_SIZE: usize = 24;

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The 24-card deck in layout order, before any shuffle.
    pub fn euchre() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::DECK_ORDER.iter().copied() {
            for rank in Rank::DECK_ORDER.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    pub fn shuffle_in_place<R: rand::Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn pop(&mut self) -> Option<Card> {
        self.cards.pop()
    }
}

/// Owns the deck for the duration of a deal.
#[derive(Debug, Clone)]
pub struct Dealer {
    deck: Deck,
    rng: StdRng,
}

impl Dealer {
    /// Builds a fresh deck and shuffles it once.
    pub fn new(rng: StdRng) -> Self {
        let mut dealer = Self {
            deck: Deck::euchre(),
            rng,
        };
        dealer.shuffle();
        dealer
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn shuffle(&mut self) {
        self.deck.shuffle_in_place(&mut self.rng);
    }

    /// Pops `count` cards off the end of the deck onto `hand`, in pop order.
    pub fn deal_cards(&mut self, hand: &mut Hand, count: usize) -> Result<(), EuchreError> {
        let remaining = self.deck.len();
        if count > remaining {
            return Err(EuchreError::EmptyDeck {
                requested: count,
                remaining,
            });
        }
        for _ in 0..count {
            if let Some(card) = self.deck.pop() {
                hand.add(card);
            }
        }
        Ok(())
    }

    pub fn flip_top_card(&mut self) -> Result<Card, EuchreError> {
        self.deck.pop().ok_or(EuchreError::EmptyDeck {
            requested: 1,
            remaining: 0,
        })
    }

    pub fn remaining(&self) -> usize {
        self.deck.len()
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }
}
