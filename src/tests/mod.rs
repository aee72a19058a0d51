mod asynch;
mod responses;
