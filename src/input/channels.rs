// Input channel lock-free
// One bounded queue from the input collaborator to the hit scorer. A full
// queue drops new events rather than blocking the producer.

use ringbuf::{HeapRb, traits::Split};

use super::event::InputEvent;

pub type InputProducer = ringbuf::HeapProd<InputEvent>;
pub type InputConsumer = ringbuf::HeapCons<InputEvent>;

pub fn create_input_channel(capacity: usize) -> (InputProducer, InputConsumer) {
    let rb = HeapRb::<InputEvent>::new(capacity);
    rb.split()
}
